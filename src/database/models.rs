/*!
 * Database entity models.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Current UTC time as a fixed-width RFC 3339 string
///
/// Microsecond precision keeps strings the same length so they sort
/// lexicographically in SQL.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Fresh entity identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// How a translation was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// Typed text
    Text,
    /// Speech transcript
    Speech,
    /// OCR from a photo
    Image,
    /// OCR from handwriting
    Handwriting,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputType::Text => write!(f, "TEXT"),
            InputType::Speech => write!(f, "SPEECH"),
            InputType::Image => write!(f, "IMAGE"),
            InputType::Handwriting => write!(f, "HANDWRITING"),
        }
    }
}

impl std::str::FromStr for InputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TEXT" => Ok(InputType::Text),
            "SPEECH" => Ok(InputType::Speech),
            "IMAGE" => Ok(InputType::Image),
            "HANDWRITING" => Ok(InputType::Handwriting),
            _ => Err(anyhow::anyhow!("Invalid input type: {}", s)),
        }
    }
}

/// Category a saved item is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavedItemCategory {
    Phrase,
    Word,
    Sentence,
    Paragraph,
    Transcript,
}

impl fmt::Display for SavedItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavedItemCategory::Phrase => write!(f, "PHRASE"),
            SavedItemCategory::Word => write!(f, "WORD"),
            SavedItemCategory::Sentence => write!(f, "SENTENCE"),
            SavedItemCategory::Paragraph => write!(f, "PARAGRAPH"),
            SavedItemCategory::Transcript => write!(f, "TRANSCRIPT"),
        }
    }
}

impl std::str::FromStr for SavedItemCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PHRASE" => Ok(SavedItemCategory::Phrase),
            "WORD" => Ok(SavedItemCategory::Word),
            "SENTENCE" => Ok(SavedItemCategory::Sentence),
            "PARAGRAPH" => Ok(SavedItemCategory::Paragraph),
            "TRANSCRIPT" => Ok(SavedItemCategory::Transcript),
            _ => Err(anyhow::anyhow!("Invalid saved item category: {}", s)),
        }
    }
}

/// Registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Login name, unique ignoring case
    pub username: String,
    /// Email address, unique ignoring case
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last profile change (RFC 3339)
    pub updated_at: String,
    /// Last successful login (RFC 3339)
    pub last_login: Option<String>,
    /// Preferred source language tag
    pub preferred_source_lang: Option<String>,
    /// Preferred target language tag
    pub preferred_target_lang: Option<String>,
    /// Free-form client settings as a JSON document
    pub settings: Option<String>,
}

impl UserRecord {
    /// Create a new user record
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        let now = now_timestamp();
        Self {
            id: new_id(),
            username,
            email,
            password_hash,
            created_at: now.clone(),
            updated_at: now,
            last_login: None,
            preferred_source_lang: None,
            preferred_target_lang: None,
            settings: None,
        }
    }
}

/// A stored translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub id: String,
    /// Owner
    pub user_id: String,
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub input_type: InputType,
    pub is_favorite: bool,
    /// JSON array of tags
    pub tags: Option<String>,
    pub created_at: String,
}

impl TranslationRecord {
    /// Create a new, non-favorite translation record
    pub fn new(
        user_id: String,
        source_text: String,
        target_text: String,
        source_lang: String,
        target_lang: String,
        input_type: InputType,
        tags: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id,
            source_text,
            target_text,
            source_lang,
            target_lang,
            input_type,
            is_favorite: false,
            tags,
            created_at: now_timestamp(),
        }
    }
}

/// A translation together with whether its owner saved it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub translation: TranslationRecord,
    pub is_saved: bool,
}

/// A user folder; `parent_folder_id` is `None` for root folders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub parent_folder_id: Option<String>,
    pub created_at: String,
}

impl FolderRecord {
    /// Create a new folder record
    pub fn new(user_id: String, name: String, parent_folder_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            user_id,
            name,
            parent_folder_id,
            created_at: now_timestamp(),
        }
    }
}

/// A bookmark on a translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedItemRecord {
    pub id: String,
    pub user_id: String,
    pub translation_id: String,
    pub category: SavedItemCategory,
    pub folder_id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

impl SavedItemRecord {
    /// Create a new saved item record
    pub fn new(
        user_id: String,
        translation_id: String,
        category: SavedItemCategory,
        folder_id: Option<String>,
        name: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            user_id,
            translation_id,
            category,
            folder_id,
            name,
            notes,
            created_at: now_timestamp(),
        }
    }
}

/// Saved item joined with its translation and folder name
#[derive(Debug, Clone)]
pub struct SavedItemDetails {
    pub item: SavedItemRecord,
    pub translation: TranslationRecord,
    pub folder_name: Option<String>,
}

/// Optional filters for listing saved items
#[derive(Debug, Clone, Default)]
pub struct SavedItemFilter {
    pub category: Option<SavedItemCategory>,
    pub folder_id: Option<String>,
    /// Filter on the underlying translation's favorite flag
    pub favorite: Option<bool>,
}

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Row offset of the first element
    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

/// One page of results plus the total element count
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: i64,
}

impl<T> Paged<T> {
    /// Number of pages for the total element count
    pub fn total_pages(&self) -> i64 {
        if self.size == 0 {
            return 0;
        }
        let size = i64::from(self.size);
        (self.total_elements + size - 1) / size
    }

    /// Transform every element, keeping paging data
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
