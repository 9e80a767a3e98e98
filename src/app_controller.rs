use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::database::{DatabaseConnection, Repository};
use crate::providers::google::GoogleCloud;
use crate::providers::Provider;
use crate::server::{self, ServerState};

// @module: Application controller wiring storage, provider and HTTP server

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Storage shared by every service
    repo: Repository,
    // @field: Cloud provider
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Open the configured database and build the Google Cloud client
    pub fn with_config(config: Config) -> Result<Self> {
        let db = match config.database.path.as_deref().filter(|path| !path.trim().is_empty()) {
            Some(path) => DatabaseConnection::new(path)
                .with_context(|| format!("Failed to open database at {}", path))?,
            None => DatabaseConnection::new_default().context("Failed to open default database")?,
        };
        info!("Using database at {}", db.path().display());

        let provider = GoogleCloud::from_config(&config.google_cloud)
            .context("Failed to set up Google Cloud client")?;

        Ok(Self::with_parts(config, Repository::new(db), Arc::new(provider)))
    }

    // @method: Assemble a controller from ready-made parts
    pub fn with_parts(config: Config, repo: Repository, provider: Arc<dyn Provider>) -> Self {
        Self { config, repo, provider }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared state for the HTTP layer
    pub fn server_state(&self) -> Arc<ServerState> {
        Arc::new(ServerState::new(&self.config, self.repo.clone(), self.provider.clone()))
    }

    /// Serve the HTTP API until the process stops
    pub async fn run_server(&self) -> Result<()> {
        let stats = self.repo.connection().stats()?;
        info!(
            "Database holds {} users, {} translations, {} folders, {} saved items",
            stats.user_count, stats.translation_count, stats.folder_count, stats.saved_item_count
        );

        if let Err(e) = self.provider.test_connection().await {
            warn!("Cloud provider check failed, continuing anyway: {}", e);
        }

        let addr = self.config.server.bind_address();
        server::run_server(self.server_state(), &addr).await
    }

    /// Verify the cloud credentials and endpoints
    pub async fn check_cloud(&self) -> Result<()> {
        info!("Testing connection to {}", self.provider.name());
        self.provider
            .test_connection()
            .await
            .with_context(|| format!("{} connection test failed", self.provider.name()))?;
        info!("{} connection OK", self.provider.name());
        Ok(())
    }
}
