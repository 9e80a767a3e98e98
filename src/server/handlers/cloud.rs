use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::error;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::server::extract::{ApiJson, ApiMultipart, AuthUser};
use crate::server::models::{TranslateBody, TtsBody};
use crate::server::response::ApiResponse;
use crate::server::state::ServerState;
use crate::services::TtsOutcome;

const TTS_UNAVAILABLE_MESSAGE: &str = "Text-to-Speech is not available for the selected language.";

/// An uploaded file
struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>,
}

/// Multipart form fields the cloud endpoints accept
#[derive(Default)]
struct UploadForm {
    file: Option<Upload>,
    language_code: Option<String>,
}

async fn field_bytes(field: Field<'_>) -> AppResult<Vec<u8>> {
    field
        .bytes()
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))
}

async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field_bytes(field).await?;
                form.file = Some(Upload { bytes, content_type });
            }
            Some("languageCode") => {
                let bytes = field_bytes(field).await?;
                form.language_code = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => {}
        }
    }

    Ok(form)
}

fn required_file(form: &mut UploadForm) -> AppResult<Upload> {
    form.file
        .take()
        .ok_or_else(|| AppError::InvalidInput("File is required".to_string()))
}

pub async fn translate(
    State(state): State<Arc<ServerState>>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<TranslateBody>,
) -> AppResult<Json<ApiResponse>> {
    let translated = state
        .cloud
        .translate(&payload.text, payload.source_lang.as_deref(), &payload.target_lang)
        .await?;
    Ok(Json(ApiResponse::success(translated)))
}

pub async fn text_to_speech(
    State(state): State<Arc<ServerState>>,
    _auth: AuthUser,
    ApiJson(payload): ApiJson<TtsBody>,
) -> Response {
    match state.cloud.text_to_speech(&payload.text, &payload.language_code).await {
        Ok(TtsOutcome::Generated(audio)) => Json(ApiResponse::with_data(
            true,
            "TTS_AUDIO_GENERATED",
            BASE64.encode(audio),
        ))
        .into_response(),
        Ok(TtsOutcome::Unavailable) => {
            Json(ApiResponse::with_data(false, "TTS_UNAVAILABLE", TTS_UNAVAILABLE_MESSAGE)).into_response()
        }
        Err(e @ AppError::InvalidInput(_)) => e.into_response(),
        Err(e) => {
            error!("Text-to-speech failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::with_data(
                    false,
                    "GENERAL_TTS_ERROR",
                    format!("Error during text-to-speech: {}", e),
                )),
            )
                .into_response()
        }
    }
}

pub async fn ocr(
    State(state): State<Arc<ServerState>>,
    _auth: AuthUser,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<Json<ApiResponse>> {
    let mut form = read_form(multipart).await?;
    let upload = required_file(&mut form)?;
    let text = state.cloud.ocr(upload.bytes).await?;
    Ok(Json(ApiResponse::success(text)))
}

pub async fn speech_to_text(
    State(state): State<Arc<ServerState>>,
    _auth: AuthUser,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<Json<ApiResponse>> {
    let mut form = read_form(multipart).await?;
    let upload = required_file(&mut form)?;
    let language_code = form
        .language_code
        .ok_or_else(|| AppError::InvalidInput("languageCode is required".to_string()))?;

    let transcript = state
        .cloud
        .speech_to_text(upload.bytes, &language_code, upload.content_type.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(transcript)))
}
