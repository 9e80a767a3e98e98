use std::sync::Arc;

use crate::app_config::{Config, PaginationConfig};
use crate::auth::JwtTokenProvider;
use crate::database::Repository;
use crate::providers::Provider;
use crate::services::{CloudService, FolderService, SavedItemService, TranslationService, UserService};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ServerState {
    pub users: UserService,
    pub translations: TranslationService,
    pub folders: FolderService,
    pub saved_items: SavedItemService,
    pub cloud: CloudService,
    pub tokens: JwtTokenProvider,
    pub pagination: PaginationConfig,
    pub max_upload_bytes: usize,
}

impl ServerState {
    /// Wire the services over one repository and provider
    pub fn new(config: &Config, repo: Repository, provider: Arc<dyn Provider>) -> Self {
        let tokens = JwtTokenProvider::from_config(&config.auth);
        Self {
            users: UserService::new(repo.clone(), tokens.clone()),
            translations: TranslationService::new(repo.clone()),
            folders: FolderService::new(repo.clone()),
            saved_items: SavedItemService::new(repo),
            cloud: CloudService::new(provider),
            tokens,
            pagination: config.pagination.clone(),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}
