use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::database::models::{SavedItemCategory, SavedItemFilter};
use crate::errors::{AppError, AppResult};
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::server::models::{CreateSavedItemRequest, SavedItemQuery, SavedItemResponse, UpdateSavedItemRequest};
use crate::server::response::{ApiResponse, PageResponse};
use crate::server::state::ServerState;
use crate::services::{page_request, NewSavedItem, SavedItemUpdate};

fn parse_category(raw: &str) -> AppResult<SavedItemCategory> {
    raw.parse()
        .map_err(|e: anyhow::Error| AppError::InvalidInput(e.to_string()))
}

pub async fn create(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateSavedItemRequest>,
) -> AppResult<(StatusCode, Json<SavedItemResponse>)> {
    let new = NewSavedItem {
        translation_id: payload.translation_id,
        category: parse_category(&payload.category)?,
        folder_id: payload.folder_id.filter(|id| !id.is_empty()),
        name: payload.name,
        notes: payload.notes,
    };
    let details = state.saved_items.create(&auth.user_id, new).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

pub async fn list(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<SavedItemQuery>,
) -> AppResult<Json<PageResponse<SavedItemResponse>>> {
    let page = page_request(query.page, query.size, &state.pagination)?;
    let filter = SavedItemFilter {
        category: query
            .category
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(parse_category)
            .transpose()?,
        folder_id: query.folder_id.filter(|id| !id.is_empty()),
        favorite: query.is_favorite,
    };

    let items = state.saved_items.list(&auth.user_id, filter, page).await?;
    Ok(Json(items.map(SavedItemResponse::from).into()))
}

pub async fn get(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(item_id): ApiPath<String>,
) -> AppResult<Json<SavedItemResponse>> {
    let details = state.saved_items.get(&auth.user_id, &item_id).await?;
    Ok(Json(details.into()))
}

pub async fn update(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(item_id): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateSavedItemRequest>,
) -> AppResult<Json<SavedItemResponse>> {
    let update = SavedItemUpdate {
        name: payload.name,
        notes: payload.notes,
        folder_id: payload.folder_id.filter(|id| !id.is_empty()),
        set_folder_id_null: payload.set_folder_id_null,
    };
    let details = state.saved_items.update(&auth.user_id, &item_id, update).await?;
    Ok(Json(details.into()))
}

pub async fn delete(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(item_id): ApiPath<String>,
) -> AppResult<Json<ApiResponse>> {
    state.saved_items.delete(&auth.user_id, &item_id).await?;
    Ok(Json(ApiResponse::success("Saved item deleted successfully")))
}
