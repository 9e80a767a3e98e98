/*!
 * Response envelopes and error mapping.
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde::Serialize;

use crate::database::models::Paged;
use crate::errors::AppError;

/// Envelope for status-style responses
#[derive(Debug, Serialize)]
pub struct ApiResponse<T = ()> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl ApiResponse<()> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn with_data(success: bool, message: impl Into<String>, data: T) -> Self {
        Self {
            success,
            message: message.into(),
            data: Some(data),
        }
    }
}

/// One page of results
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub size: u32,
    pub number: u32,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: usize,
    pub empty: bool,
}

impl<T> From<Paged<T>> for PageResponse<T> {
    fn from(paged: Paged<T>) -> Self {
        let total_pages = paged.total_pages();
        let number_of_elements = paged.items.len();
        Self {
            total_elements: paged.total_elements,
            total_pages,
            size: paged.size,
            number: paged.page,
            first: paged.page == 0,
            last: i64::from(paged.page) + 1 >= total_pages,
            number_of_elements,
            empty: number_of_elements == 0,
            content: paged.items,
        }
    }
}

impl AppError {
    /// HTTP status for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Config(_) | AppError::Unknown(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self);
            "An unexpected error occurred".to_string()
        } else {
            if status == StatusCode::BAD_GATEWAY {
                warn!("Cloud provider call failed: {}", self);
            }
            self.to_string()
        };

        (status, Json(ApiResponse::failure(message))).into_response()
    }
}
