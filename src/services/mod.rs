/*!
 * Service layer.
 *
 * Services validate input, enforce ownership and orchestrate the repository
 * and the cloud provider. They speak `AppError` so the HTTP layer can map
 * failures to status codes without knowing where they came from.
 */

pub mod cloud;
pub mod folders;
pub mod saved_items;
pub mod translations;
pub mod users;

pub use cloud::{CloudService, TtsOutcome};
pub use folders::FolderService;
pub use saved_items::{NewSavedItem, SavedItemService, SavedItemUpdate};
pub use translations::{NewTranslation, TranslationService};
pub use users::{Preferences, ProfileUpdate, UserService};

use crate::app_config::PaginationConfig;
use crate::database::models::PageRequest;
use crate::errors::{AppError, AppResult};
use crate::language_utils;

/// Reject access to an entity owned by someone else
pub(crate) fn ensure_owner(owner_id: &str, user_id: &str, entity: &str) -> AppResult<()> {
    if owner_id == user_id {
        Ok(())
    } else {
        Err(AppError::forbidden(entity))
    }
}

/// Build a page request from optional query values
///
/// `page` defaults to 0 and `size` to the configured default; a size outside
/// `1..=max_page_size` is rejected.
pub fn page_request(page: Option<u32>, size: Option<u32>, config: &PaginationConfig) -> AppResult<PageRequest> {
    let size = size.unwrap_or(config.default_page_size);
    if size == 0 || size > config.max_page_size {
        return Err(AppError::InvalidInput(format!(
            "Page size must be between 1 and {}",
            config.max_page_size
        )));
    }

    Ok(PageRequest {
        page: page.unwrap_or(0),
        size,
    })
}

/// Trim a required text field, rejecting blank values
pub(crate) fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalize a language code, optionally accepting the auto-detect marker
pub(crate) fn language_code(code: &str, allow_auto: bool) -> AppResult<String> {
    let code = required_text(code, "Language code")?;
    let code = code.as_str();
    if allow_auto && language_utils::is_auto_detect(code) {
        return Ok(language_utils::AUTO_DETECT.to_string());
    }
    language_utils::normalize_language_tag(code)
        .map_err(|e| AppError::InvalidInput(e.to_string()))
}
