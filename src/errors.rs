/*!
 * Error types for the rosetta application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with the cloud provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The requested voice or language has no speech synthesis support
    #[error("Unsupported voice: {0}")]
    UnsupportedVoice(String),
}

/// Main application error type returned by the service layer
#[derive(Error, Debug)]
pub enum AppError {
    /// Request data failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Entity belongs to another user
    #[error("{0}")]
    Forbidden(String),

    /// Entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness rule violated
    #[error("{0}")]
    Conflict(String),

    /// Error from the cloud provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the persistence layer
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result alias used by the service layer
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for a not-found error naming the entity
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{} not found", entity))
    }

    /// Shorthand for an ownership violation naming the entity
    pub fn forbidden(entity: &str) -> Self {
        Self::Forbidden(format!("You don't have permission to access this {}", entity))
    }
}

/// Repository calls report failures through anyhow; unique and foreign key
/// violations surface as conflicts, other SQLite errors as database errors.
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(sqlite) = error.downcast_ref::<rusqlite::Error>() {
            if let rusqlite::Error::SqliteFailure(failure, message) = sqlite {
                if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                    return Self::Conflict(
                        message.clone().unwrap_or_else(|| "Constraint violation".to_string()),
                    );
                }
            }
            return Self::Database(sqlite.to_string());
        }
        Self::Unknown(error.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Unknown(format!("Background task failed: {}", error))
    }
}
