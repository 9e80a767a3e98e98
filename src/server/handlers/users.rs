use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::server::extract::{ApiJson, AuthUser};
use crate::server::models::{json_text, UpdateProfileRequest, UserResponse};
use crate::server::state::ServerState;
use crate::services::{Preferences, ProfileUpdate};

pub async fn me(State(state): State<Arc<ServerState>>, auth: AuthUser) -> AppResult<Json<UserResponse>> {
    let user = state.users.get_user(&auth.user_id).await?;
    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<Arc<ServerState>>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = ProfileUpdate {
        preferences: payload.preferences.map(|preferences| Preferences {
            source_lang: preferences.source_lang,
            target_lang: preferences.target_lang,
        }),
        settings: payload.settings.map(json_text),
    };
    let user = state.users.update_profile(&auth.user_id, update).await?;
    Ok(Json(user.into()))
}
