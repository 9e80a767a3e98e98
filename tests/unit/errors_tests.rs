/*!
 * Tests for error types and conversions
 */

use axum::http::StatusCode;
use rosetta::errors::{AppError, ProviderError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 400,
        message: "INVALID_ARGUMENT: bad language".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("400"));
    assert!(display.contains("bad language"));
}

#[test]
fn test_providerError_unsupportedVoice_shouldDisplayCorrectly() {
    let error = ProviderError::UnsupportedVoice("Voice does not exist".to_string());
    assert!(error.to_string().contains("Unsupported voice"));
}

#[test]
fn test_appError_fromProviderError_shouldWrapAsProvider() {
    let error: AppError = ProviderError::ConnectionError("down".to_string()).into();
    assert!(matches!(error, AppError::Provider(_)));
    assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_appError_helpers_shouldNameEntity() {
    assert_eq!(AppError::not_found("Folder").to_string(), "Folder not found");
    assert_eq!(
        AppError::forbidden("folder").to_string(),
        "You don't have permission to access this folder"
    );
}

#[test]
fn test_appError_fromAnyhowConstraintViolation_shouldBeConflict() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (name TEXT UNIQUE); INSERT INTO t VALUES ('a');")
        .unwrap();
    let sqlite_error = conn.execute("INSERT INTO t VALUES ('a')", []).unwrap_err();

    let error: AppError = anyhow::Error::from(sqlite_error).into();

    assert!(matches!(error, AppError::Conflict(_)));
    assert_eq!(error.status_code(), StatusCode::CONFLICT);
}

#[test]
fn test_appError_fromAnyhowOtherSqliteError_shouldBeDatabase() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let sqlite_error = conn.execute("SELECT * FROM missing_table", []).unwrap_err();

    let error: AppError = anyhow::Error::from(sqlite_error).into();

    assert!(matches!(error, AppError::Database(_)));
}

#[test]
fn test_appError_fromAnyhowPlainError_shouldBeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, AppError::Unknown(_)));
    assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
