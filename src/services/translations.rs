/*!
 * Translation history and favorites.
 */

use log::info;

use super::{ensure_owner, language_code, required_text};
use crate::database::models::{HistoryEntry, InputType, PageRequest, Paged, TranslationRecord};
use crate::database::Repository;
use crate::errors::{AppError, AppResult};

/// Data for a translation to store
#[derive(Debug, Clone)]
pub struct NewTranslation {
    pub source_text: String,
    pub target_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub input_type: InputType,
    /// Raw JSON document
    pub tags: Option<String>,
}

/// Translation history service
#[derive(Clone)]
pub struct TranslationService {
    repo: Repository,
}

impl TranslationService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Store a translation in the user's history
    pub async fn save_translation(&self, user_id: &str, new: NewTranslation) -> AppResult<TranslationRecord> {
        let source_text = required_text(&new.source_text, "Source text")?;
        let target_text = required_text(&new.target_text, "Target text")?;
        let source_lang = language_code(&new.source_lang, true)?;
        let target_lang = language_code(&new.target_lang, false)?;

        let tags = match new.tags {
            Some(tags) if !tags.trim().is_empty() => {
                serde_json::from_str::<serde_json::Value>(&tags)
                    .map_err(|e| AppError::InvalidInput(format!("Tags must be valid JSON: {}", e)))?;
                Some(tags)
            }
            _ => None,
        };

        let translation = TranslationRecord::new(
            user_id.to_string(),
            source_text,
            target_text,
            source_lang,
            target_lang,
            new.input_type,
            tags,
        );
        self.repo.create_translation(&translation).await?;

        Ok(translation)
    }

    /// Page through the user's history, newest first
    pub async fn history(&self, user_id: &str, page: PageRequest) -> AppResult<Paged<HistoryEntry>> {
        Ok(self.repo.list_history(user_id, page).await?)
    }

    /// Load a translation the user owns
    pub async fn get_owned(&self, user_id: &str, translation_id: &str) -> AppResult<TranslationRecord> {
        let translation = self
            .repo
            .get_translation(translation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Translation"))?;
        ensure_owner(&translation.user_id, user_id, "translation")?;
        Ok(translation)
    }

    /// Delete a translation together with the saved items referencing it
    pub async fn delete_translation(&self, user_id: &str, translation_id: &str) -> AppResult<()> {
        let translation = self.get_owned(user_id, translation_id).await?;
        if !self.repo.delete_translation(&translation.id).await? {
            return Err(AppError::not_found("Translation"));
        }
        info!("Deleted translation {} for user {}", translation.id, user_id);
        Ok(())
    }

    /// Flip the favorite flag and return the updated translation
    pub async fn toggle_favorite(&self, user_id: &str, translation_id: &str) -> AppResult<HistoryEntry> {
        let mut translation = self.get_owned(user_id, translation_id).await?;
        translation.is_favorite = !translation.is_favorite;
        if !self
            .repo
            .set_translation_favorite(&translation.id, translation.is_favorite)
            .await?
        {
            return Err(AppError::not_found("Translation"));
        }

        let is_saved = self.repo.translation_is_saved(user_id, &translation.id).await?;
        Ok(HistoryEntry { translation, is_saved })
    }
}
