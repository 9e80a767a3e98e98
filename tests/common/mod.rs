/*!
 * Common test utilities for the rosetta test suite
 */

use std::sync::{Arc, Once};

use rosetta::app_config::Config;
use rosetta::database::models::{InputType, TranslationRecord, UserRecord};
use rosetta::providers::mock::MockProvider;
use rosetta::server::ServerState;
use rosetta::services::{FolderService, NewTranslation, SavedItemService, TranslationService};
use rosetta::Repository;

static INIT_LOGGING: Once = Once::new();

/// Route log output through the test harness
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Valid configuration for tests
pub fn test_config() -> Config {
    let mut config = Config::with_generated_secret();
    config.google_cloud.project_id = "test-project".to_string();
    config.google_cloud.api_key = "test-key".to_string();
    config
}

/// In-memory repository
pub fn create_test_repo() -> Repository {
    Repository::new_in_memory().expect("Failed to create test repository")
}

/// Server state over an in-memory repository and the given provider
pub fn create_test_state(provider: MockProvider) -> Arc<ServerState> {
    create_test_state_with_repo(provider).0
}

/// Server state plus a handle on the repository behind it
pub fn create_test_state_with_repo(provider: MockProvider) -> (Arc<ServerState>, Repository) {
    init_logging();
    let repo = create_test_repo();
    let state = Arc::new(ServerState::new(&test_config(), repo.clone(), Arc::new(provider)));
    (state, repo)
}

/// Library services sharing one repository
pub struct TestLibrary {
    pub repo: Repository,
    pub translations: TranslationService,
    pub folders: FolderService,
    pub saved_items: SavedItemService,
}

impl TestLibrary {
    pub fn new() -> Self {
        init_logging();
        let repo = create_test_repo();
        Self {
            translations: TranslationService::new(repo.clone()),
            folders: FolderService::new(repo.clone()),
            saved_items: SavedItemService::new(repo.clone()),
            repo,
        }
    }

    /// Insert a user directly, skipping password hashing
    pub async fn create_user(&self, username: &str) -> UserRecord {
        let user = UserRecord::new(
            username.to_string(),
            format!("{}@example.com", username),
            "not-a-real-hash".to_string(),
        );
        self.repo.create_user(&user).await.expect("Failed to create user");
        user
    }

    /// Store a text translation for a user
    pub async fn create_translation(&self, user_id: &str, source_text: &str) -> TranslationRecord {
        self.translations
            .save_translation(
                user_id,
                NewTranslation {
                    source_text: source_text.to_string(),
                    target_text: format!("[es] {}", source_text),
                    source_lang: "en".to_string(),
                    target_lang: "es".to_string(),
                    input_type: InputType::Text,
                    tags: None,
                },
            )
            .await
            .expect("Failed to save translation")
    }
}
