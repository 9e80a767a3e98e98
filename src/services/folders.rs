/*!
 * Hierarchical folders for filing saved items.
 *
 * Sibling folders must have distinct names (root folders included), a folder
 * can never become its own ancestor, and only empty folders can be deleted.
 */

use log::info;

use super::{ensure_owner, required_text};
use crate::database::models::FolderRecord;
use crate::database::Repository;
use crate::errors::{AppError, AppResult};

const FOLDER_NAME_MAX_CHARS: usize = 100;

/// Folder management service
#[derive(Clone)]
pub struct FolderService {
    repo: Repository,
}

impl FolderService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Load a folder the user owns
    pub async fn get_owned(&self, user_id: &str, folder_id: &str) -> AppResult<FolderRecord> {
        let folder = self
            .repo
            .get_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found("Folder"))?;
        ensure_owner(&folder.user_id, user_id, "folder")?;
        Ok(folder)
    }

    /// Create a folder at the root or under `parent_folder_id`
    pub async fn create_folder(
        &self,
        user_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> AppResult<FolderRecord> {
        let name = validate_name(name)?;
        if let Some(parent_id) = parent_folder_id {
            self.get_owned(user_id, parent_id).await?;
        }

        self.ensure_name_free(user_id, parent_folder_id, &name, None).await?;

        let folder = FolderRecord::new(
            user_id.to_string(),
            name,
            parent_folder_id.map(str::to_string),
        );
        self.repo.create_folder(&folder).await?;
        info!("Created folder '{}' ({}) for user {}", folder.name, folder.id, user_id);

        Ok(folder)
    }

    /// Root folders, newest first
    pub async fn root_folders(&self, user_id: &str) -> AppResult<Vec<FolderRecord>> {
        Ok(self.repo.list_folders(user_id, None).await?)
    }

    /// Direct children of a folder the user owns, newest first
    pub async fn sub_folders(&self, user_id: &str, parent_folder_id: &str) -> AppResult<Vec<FolderRecord>> {
        let parent = self.get_owned(user_id, parent_folder_id).await?;
        Ok(self.repo.list_folders(user_id, Some(&parent.id)).await?)
    }

    /// Rename a folder
    pub async fn rename_folder(&self, user_id: &str, folder_id: &str, new_name: &str) -> AppResult<FolderRecord> {
        let mut folder = self.get_owned(user_id, folder_id).await?;
        let name = validate_name(new_name)?;

        self.ensure_name_free(user_id, folder.parent_folder_id.as_deref(), &name, Some(&folder.id))
            .await?;

        self.repo.rename_folder(&folder.id, &name).await?;
        folder.name = name;
        Ok(folder)
    }

    /// Move a folder under `new_parent_id`, or to the root when `None`
    pub async fn move_folder(
        &self,
        user_id: &str,
        folder_id: &str,
        new_parent_id: Option<&str>,
    ) -> AppResult<FolderRecord> {
        let mut folder = self.get_owned(user_id, folder_id).await?;

        if let Some(parent_id) = new_parent_id {
            let parent = self.get_owned(user_id, parent_id).await?;
            let lineage = self.repo.folder_lineage(&parent.id).await?;
            if lineage.iter().any(|id| *id == folder.id) {
                return Err(AppError::InvalidInput(
                    "Cannot move a folder into itself or one of its subfolders".to_string(),
                ));
            }
        }

        self.ensure_name_free(user_id, new_parent_id, &folder.name, Some(&folder.id))
            .await?;

        self.repo.set_folder_parent(&folder.id, new_parent_id).await?;
        folder.parent_folder_id = new_parent_id.map(str::to_string);
        info!("Moved folder {} under {:?}", folder.id, folder.parent_folder_id);

        Ok(folder)
    }

    /// Delete an empty folder
    pub async fn delete_folder(&self, user_id: &str, folder_id: &str) -> AppResult<()> {
        let folder = self.get_owned(user_id, folder_id).await?;

        if self.repo.count_subfolders(&folder.id).await? > 0 {
            return Err(AppError::InvalidInput(
                "Cannot delete folder with subfolders. Delete or move subfolders first.".to_string(),
            ));
        }
        if self.repo.count_items_in_folder(&folder.id).await? > 0 {
            return Err(AppError::InvalidInput(
                "Cannot delete folder that contains saved items. Move or delete items first.".to_string(),
            ));
        }

        self.repo.delete_folder(&folder.id).await?;
        info!("Deleted folder {} for user {}", folder.id, user_id);
        Ok(())
    }

    async fn ensure_name_free(
        &self,
        user_id: &str,
        parent_folder_id: Option<&str>,
        name: &str,
        exclude_folder_id: Option<&str>,
    ) -> AppResult<()> {
        if self
            .repo
            .folder_name_exists(user_id, parent_folder_id, name, exclude_folder_id)
            .await?
        {
            return Err(AppError::Conflict(format!(
                "A folder named '{}' already exists in this location",
                name
            )));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = required_text(name, "Folder name")?;
    if name.chars().count() > FOLDER_NAME_MAX_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Folder name must be at most {} characters",
            FOLDER_NAME_MAX_CHARS
        )));
    }
    Ok(name)
}
