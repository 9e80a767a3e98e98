pub mod auth;
pub mod cloud;
pub mod folders;
pub mod saved_items;
pub mod translations;
pub mod users;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
