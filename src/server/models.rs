/*!
 * Request and response bodies of the HTTP API (camelCase JSON).
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::models::{FolderRecord, HistoryEntry, InputType, SavedItemDetails, TranslationRecord, UserRecord};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBody {
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
    pub last_login: Option<String>,
    pub preferences: PreferencesBody,
    pub settings: Option<Value>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            preferences: PreferencesBody {
                source_lang: user.preferred_source_lang,
                target_lang: user.preferred_target_lang,
            },
            settings: user.settings.as_deref().map(json_or_string),
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub preferences: Option<PreferencesBody>,
    /// Either a JSON document or a string holding one
    pub settings: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateBody {
    #[serde(default)]
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsBody {
    pub text: String,
    pub language_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTranslationRequest {
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub input_type: Option<InputType>,
    #[serde(default)]
    pub tags: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub id: String,
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub input_type: InputType,
    pub is_favorite: bool,
    pub is_saved: bool,
    pub tags: Option<Value>,
    pub created_at: String,
}

impl TranslationResponse {
    pub fn new(translation: TranslationRecord, is_saved: bool) -> Self {
        Self {
            tags: translation.tags.as_deref().map(json_or_string),
            id: translation.id,
            source_text: translation.source_text,
            target_text: translation.target_text,
            source_lang: translation.source_lang,
            target_lang: translation.target_lang,
            input_type: translation.input_type,
            is_favorite: translation.is_favorite,
            is_saved,
            created_at: translation.created_at,
        }
    }
}

impl From<HistoryEntry> for TranslationResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self::new(entry.translation, entry.is_saved)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameFolderRequest {
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MoveFolderRequest {
    /// `None` moves the folder to the root
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderQuery {
    pub parent_folder_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    pub parent_folder_id: Option<String>,
    pub created_at: String,
}

impl From<FolderRecord> for FolderResponse {
    fn from(folder: FolderRecord) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_folder_id: folder.parent_folder_id,
            created_at: folder.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSavedItemRequest {
    pub translation_id: String,
    pub category: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSavedItemRequest {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub folder_id: Option<String>,
    pub set_folder_id_null: bool,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedItemQuery {
    pub category: Option<String>,
    pub folder_id: Option<String>,
    pub is_favorite: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItemResponse {
    pub id: String,
    pub translation_id: String,
    pub category: String,
    pub folder_id: Option<String>,
    pub folder_name: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub translation: TranslationResponse,
}

impl From<SavedItemDetails> for SavedItemResponse {
    fn from(details: SavedItemDetails) -> Self {
        let item = details.item;
        Self {
            id: item.id,
            translation_id: item.translation_id,
            category: item.category.to_string(),
            folder_id: item.folder_id,
            folder_name: details.folder_name,
            name: item.name,
            notes: item.notes,
            created_at: item.created_at,
            translation: TranslationResponse::new(details.translation, true),
        }
    }
}

/// Stored JSON text back to a value; text that is not JSON stays a string
fn json_or_string(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// A JSON value from a request as text to store; strings are taken verbatim
pub fn json_text(value: Value) -> String {
    match value {
        Value::String(raw) => raw,
        other => other.to_string(),
    }
}
