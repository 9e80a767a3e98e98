use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::server::models::{CreateFolderRequest, FolderQuery, FolderResponse, MoveFolderRequest, RenameFolderRequest};
use crate::server::response::ApiResponse;
use crate::server::state::ServerState;

pub async fn create(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateFolderRequest>,
) -> AppResult<(StatusCode, Json<FolderResponse>)> {
    let folder = state
        .folders
        .create_folder(&auth.user_id, &payload.name, payload.parent_folder_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(folder.into())))
}

/// Root folders, or the children of `parentFolderId`
pub async fn list(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<FolderQuery>,
) -> AppResult<Json<Vec<FolderResponse>>> {
    let folders = match query.parent_folder_id.as_deref().filter(|id| !id.is_empty()) {
        Some(parent_id) => state.folders.sub_folders(&auth.user_id, parent_id).await?,
        None => state.folders.root_folders(&auth.user_id).await?,
    };
    Ok(Json(folders.into_iter().map(FolderResponse::from).collect()))
}

pub async fn rename(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(folder_id): ApiPath<String>,
    ApiJson(payload): ApiJson<RenameFolderRequest>,
) -> AppResult<Json<FolderResponse>> {
    let folder = state
        .folders
        .rename_folder(&auth.user_id, &folder_id, &payload.name)
        .await?;
    Ok(Json(folder.into()))
}

pub async fn move_folder(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(folder_id): ApiPath<String>,
    ApiJson(payload): ApiJson<MoveFolderRequest>,
) -> AppResult<Json<FolderResponse>> {
    let folder = state
        .folders
        .move_folder(&auth.user_id, &folder_id, payload.parent_folder_id.as_deref())
        .await?;
    Ok(Json(folder.into()))
}

pub async fn delete(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(folder_id): ApiPath<String>,
) -> AppResult<Json<ApiResponse>> {
    state.folders.delete_folder(&auth.user_id, &folder_id).await?;
    Ok(Json(ApiResponse::success("Folder deleted successfully")))
}
