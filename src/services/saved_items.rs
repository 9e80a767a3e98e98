/*!
 * Saved items: bookmarks on translations, optionally filed in folders.
 *
 * Saving a translation marks it favorite in the same transaction. A user can
 * save a given translation only once, and only into folders they own.
 */

use log::info;

use super::{ensure_owner, FolderService, TranslationService};
use crate::database::models::{
    PageRequest, Paged, SavedItemCategory, SavedItemDetails, SavedItemFilter, SavedItemRecord,
};
use crate::database::Repository;
use crate::errors::{AppError, AppResult};

/// Names longer than this are shortened when derived from the source text
const DEFAULT_NAME_MAX_CHARS: usize = 50;
const DEFAULT_NAME_KEEP_CHARS: usize = 47;

/// Data for a new saved item
#[derive(Debug, Clone)]
pub struct NewSavedItem {
    pub translation_id: String,
    pub category: SavedItemCategory,
    pub folder_id: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

/// Changes to a saved item; category and translation cannot change
#[derive(Debug, Clone, Default)]
pub struct SavedItemUpdate {
    /// Ignored when blank
    pub name: Option<String>,
    pub notes: Option<String>,
    pub folder_id: Option<String>,
    /// Move to the root; wins over `folder_id`
    pub set_folder_id_null: bool,
}

/// Saved item service
#[derive(Clone)]
pub struct SavedItemService {
    repo: Repository,
    translations: TranslationService,
    folders: FolderService,
}

impl SavedItemService {
    pub fn new(repo: Repository) -> Self {
        Self {
            translations: TranslationService::new(repo.clone()),
            folders: FolderService::new(repo.clone()),
            repo,
        }
    }

    /// Save a translation
    pub async fn create(&self, user_id: &str, new: NewSavedItem) -> AppResult<SavedItemDetails> {
        let translation = self.translations.get_owned(user_id, &new.translation_id).await?;

        if self.repo.saved_item_exists(user_id, &translation.id).await? {
            return Err(AppError::Conflict("This translation is already saved.".to_string()));
        }

        if let Some(folder_id) = &new.folder_id {
            self.folders.get_owned(user_id, folder_id).await?;
        }

        let name = match new.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_name(&translation.source_text),
        };

        let item = SavedItemRecord::new(
            user_id.to_string(),
            translation.id,
            new.category,
            new.folder_id,
            Some(name),
            new.notes,
        );
        self.repo.create_saved_item(&item).await?;
        info!("User {} saved translation {} as {}", user_id, item.translation_id, item.id);

        self.load(&item.id).await
    }

    /// Page through the user's saved items, newest first
    pub async fn list(
        &self,
        user_id: &str,
        filter: SavedItemFilter,
        page: PageRequest,
    ) -> AppResult<Paged<SavedItemDetails>> {
        if let Some(folder_id) = &filter.folder_id {
            self.folders.get_owned(user_id, folder_id).await?;
        }
        Ok(self.repo.list_saved_items(user_id, &filter, page).await?)
    }

    /// Load a saved item the user owns
    pub async fn get(&self, user_id: &str, item_id: &str) -> AppResult<SavedItemDetails> {
        let details = self.load(item_id).await?;
        ensure_owner(&details.item.user_id, user_id, "saved item")?;
        Ok(details)
    }

    /// Update name, notes or folder
    pub async fn update(&self, user_id: &str, item_id: &str, update: SavedItemUpdate) -> AppResult<SavedItemDetails> {
        let mut item = self.get(user_id, item_id).await?.item;

        if let Some(name) = update.name {
            if !name.trim().is_empty() {
                item.name = Some(name.trim().to_string());
            }
        }
        if let Some(notes) = update.notes {
            item.notes = Some(notes);
        }

        if update.set_folder_id_null {
            item.folder_id = None;
        } else if let Some(folder_id) = update.folder_id {
            self.folders.get_owned(user_id, &folder_id).await?;
            item.folder_id = Some(folder_id);
        }

        self.repo.update_saved_item(&item).await?;
        self.load(&item.id).await
    }

    /// Delete a saved item; the translation stays a favorite
    pub async fn delete(&self, user_id: &str, item_id: &str) -> AppResult<()> {
        let details = self.get(user_id, item_id).await?;
        if !self.repo.delete_saved_item(&details.item.id).await? {
            return Err(AppError::not_found("Saved item"));
        }
        Ok(())
    }

    async fn load(&self, item_id: &str) -> AppResult<SavedItemDetails> {
        self.repo
            .get_saved_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found("Saved item"))
    }
}

/// Name derived from the source text
fn default_name(source_text: &str) -> String {
    let source_text = source_text.trim();
    if source_text.chars().count() > DEFAULT_NAME_MAX_CHARS {
        let kept: String = source_text.chars().take(DEFAULT_NAME_KEEP_CHARS).collect();
        format!("{}...", kept)
    } else {
        source_text.to_string()
    }
}
