use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::server::extract::ApiJson;
use crate::server::models::{LoginRequest, LoginResponse, RegisterRequest};
use crate::server::response::ApiResponse;
use crate::server::state::ServerState;

pub async fn register(
    State(state): State<Arc<ServerState>>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse>)> {
    state
        .users
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("User registered successfully")),
    ))
}

pub async fn login(
    State(state): State<Arc<ServerState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (_, access_token) = state
        .users
        .login(&payload.username_or_email, &payload.password)
        .await?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
    }))
}
