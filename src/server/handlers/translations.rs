use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::database::models::InputType;
use crate::errors::AppResult;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, AuthUser};
use crate::server::models::{json_text, PageQuery, SaveTranslationRequest, TranslationResponse};
use crate::server::response::{ApiResponse, PageResponse};
use crate::server::state::ServerState;
use crate::services::{page_request, NewTranslation};

pub async fn save(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SaveTranslationRequest>,
) -> AppResult<(StatusCode, Json<TranslationResponse>)> {
    let translation = state
        .translations
        .save_translation(
            &auth.user_id,
            NewTranslation {
                source_text: payload.source_text,
                target_text: payload.target_text,
                source_lang: payload.source_lang,
                target_lang: payload.target_lang,
                input_type: payload.input_type.unwrap_or(InputType::Text),
                tags: payload.tags.map(json_text),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(TranslationResponse::new(translation, false))))
}

pub async fn history(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> AppResult<Json<PageResponse<TranslationResponse>>> {
    let page = page_request(query.page, query.size, &state.pagination)?;
    let history = state.translations.history(&auth.user_id, page).await?;
    Ok(Json(history.map(TranslationResponse::from).into()))
}

pub async fn delete(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(translation_id): ApiPath<String>,
) -> AppResult<Json<ApiResponse>> {
    state
        .translations
        .delete_translation(&auth.user_id, &translation_id)
        .await?;
    Ok(Json(ApiResponse::success("Translation deleted successfully")))
}

pub async fn toggle_favorite(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiPath(translation_id): ApiPath<String>,
) -> AppResult<Json<TranslationResponse>> {
    let entry = state
        .translations
        .toggle_favorite(&auth.user_id, &translation_id)
        .await?;
    Ok(Json(entry.into()))
}
