use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use log::info;
use std::time::Instant;

/// Answer preflight requests and add permissive CORS headers
pub async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

/// Log method, path, status and elapsed time of every request
pub async fn log_requests(req: Request<Body>, next: Next) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
