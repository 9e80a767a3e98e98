/*!
 * HTTP API.
 *
 * Public routes cover health and authentication; everything under `/api`
 * besides `/api/auth` requires a bearer token.
 */

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod response;
pub mod state;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use log::info;
use std::sync::Arc;

pub use response::{ApiResponse, PageResponse};
pub use state::ServerState;

use handlers::{auth, cloud, folders, saved_items, translations, users};

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/translate", post(cloud::translate))
        .route("/api/tts", post(cloud::text_to_speech))
        .route("/api/ocr", post(cloud::ocr))
        .route("/api/speech", post(cloud::speech_to_text))
        .route("/api/user/me", get(users::me).put(users::update_me))
        .route(
            "/api/translations",
            post(translations::save).get(translations::history),
        )
        .route("/api/translations/:id", axum::routing::delete(translations::delete))
        .route("/api/translations/:id/favorite", patch(translations::toggle_favorite))
        .route("/api/folders", post(folders::create).get(folders::list))
        .route("/api/folders/:id", put(folders::rename).delete(folders::delete))
        .route("/api/folders/:id/move", post(folders::move_folder))
        .route(
            "/api/saved-items",
            post(saved_items::create).get(saved_items::list),
        )
        .route(
            "/api/saved-items/:id",
            get(saved_items::get)
                .put(saved_items::update)
                .delete(saved_items::delete),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(axum::middleware::from_fn(middleware::cors_middleware))
}

/// Bind `addr` and serve until the process is stopped
pub async fn run_server(state: Arc<ServerState>, addr: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind server address {}", addr))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
