use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::state::ServerState;
use crate::errors::AppError;

/// The user a request's bearer token belongs to
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<ServerState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ServerState>) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let user_id = state.tokens.validate_token(token)?;

        // Tokens outlive deleted accounts
        match state.users.get_user(&user_id).await {
            Ok(_) => Ok(AuthUser { user_id }),
            Err(AppError::NotFound(_)) => Err(AppError::Unauthorized("User no longer exists".to_string())),
            Err(e) => Err(e),
        }
    }
}

/// JSON body whose rejections answer with the error envelope
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string whose rejections answer with the error envelope
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters whose rejections answer with the error envelope
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Multipart body; a missing or wrong content type is invalid input
pub struct ApiMultipart(pub Multipart);

#[axum::async_trait]
impl<S> FromRequest<S> for ApiMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection: MultipartRejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(Self(multipart))
    }
}
