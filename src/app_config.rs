use anyhow::{anyhow, Context, Result};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the server configuration.
/// Values come from `conf.json`, then environment variables, then CLI flags.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Cloud platform settings
    #[serde(default)]
    pub google_cloud: GoogleCloudConfig,

    /// Paging limits for list endpoints
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body, in bytes (uploads included)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Database configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// Access token configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens
    #[serde(default)]
    pub jwt_secret: String,

    /// Token lifetime in milliseconds
    #[serde(default = "default_jwt_expiration_ms")]
    pub jwt_expiration_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiration_ms: default_jwt_expiration_ms(),
        }
    }
}

/// Google Cloud configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GoogleCloudConfig {
    /// Project used for Translation v3 calls
    #[serde(default)]
    pub project_id: String,

    /// Translation location (usually "global")
    #[serde(default = "default_location")]
    pub location: String,

    /// Base64-encoded service account JSON key
    #[serde(default)]
    pub credentials_base64: String,

    /// API key, used when no service account is configured
    #[serde(default)]
    pub api_key: String,

    /// Translation API base URL
    #[serde(default = "default_translation_endpoint")]
    pub translation_endpoint: String,

    /// Vision API base URL
    #[serde(default = "default_vision_endpoint")]
    pub vision_endpoint: String,

    /// Speech-to-Text API base URL
    #[serde(default = "default_speech_endpoint")]
    pub speech_endpoint: String,

    /// Text-to-Speech API base URL
    #[serde(default = "default_text_to_speech_endpoint")]
    pub text_to_speech_endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl GoogleCloudConfig {
    /// Whether any credential is configured
    pub fn has_credentials(&self) -> bool {
        !self.credentials_base64.trim().is_empty() || !self.api_key.trim().is_empty()
    }
}

impl Default for GoogleCloudConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: default_location(),
            credentials_base64: String::new(),
            api_key: String::new(),
            translation_endpoint: default_translation_endpoint(),
            vision_endpoint: default_vision_endpoint(),
            speech_endpoint: default_speech_endpoint(),
            text_to_speech_endpoint: default_text_to_speech_endpoint(),
            timeout_secs: default_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Paging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaginationConfig {
    /// Page size when the client sends none
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a client may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Shortest accepted token signing secret, in bytes
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Most retries a Google Cloud call may be configured with
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_jwt_expiration_ms() -> u64 {
    86_400_000 // 24 hours
}

fn default_location() -> String {
    "global".to_string()
}

fn default_translation_endpoint() -> String {
    "https://translation.googleapis.com".to_string()
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

fn default_speech_endpoint() -> String {
    "https://speech.googleapis.com".to_string()
}

fn default_text_to_speech_endpoint() -> String {
    "https://texttospeech.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

impl Config {
    /// Load the configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::with_generated_secret();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Default configuration with a freshly generated signing secret
    pub fn with_generated_secret() -> Self {
        let mut config = Self::default();
        config.auth.jwt_secret = generate_secret(64);
        config
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("ROSETTA_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ROSETTA_PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("ROSETTA_PORT is not a valid port: {}", port))?;
        }
        if let Some(path) = lookup("ROSETTA_DB_PATH") {
            self.database.path = Some(path);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(expiration) = lookup("JWT_EXPIRATION_MS") {
            self.auth.jwt_expiration_ms = expiration
                .parse()
                .with_context(|| format!("JWT_EXPIRATION_MS is not a number: {}", expiration))?;
        }
        if let Some(project) = lookup("GOOGLE_CLOUD_PROJECT_ID") {
            self.google_cloud.project_id = project;
        }
        if let Some(credentials) = lookup("GOOGLE_CLOUD_CREDENTIALS_BASE64") {
            self.google_cloud.credentials_base64 = credentials;
        }
        if let Some(api_key) = lookup("GOOGLE_CLOUD_API_KEY") {
            self.google_cloud.api_key = api_key;
        }
        if let Some(level) = lookup("ROSETTA_LOG_LEVEL") {
            self.log_level = level.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be non-zero"));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(anyhow!("server.max_upload_bytes must be greater than zero"));
        }

        if self.auth.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(anyhow!(
                "auth.jwt_secret must be at least {} bytes long",
                MIN_JWT_SECRET_BYTES
            ));
        }

        if self.auth.jwt_expiration_ms == 0 {
            return Err(anyhow!("auth.jwt_expiration_ms must be greater than zero"));
        }

        // A service-account key carries its own project id
        if self.google_cloud.project_id.trim().is_empty()
            && self.google_cloud.credentials_base64.trim().is_empty()
        {
            return Err(anyhow!(
                "google_cloud.project_id is required unless google_cloud.credentials_base64 is set"
            ));
        }

        if self.google_cloud.retry_count > MAX_RETRY_COUNT {
            return Err(anyhow!(
                "google_cloud.retry_count must be at most {}",
                MAX_RETRY_COUNT
            ));
        }

        if !self.google_cloud.has_credentials() {
            return Err(anyhow!(
                "Either google_cloud.credentials_base64 or google_cloud.api_key is required"
            ));
        }

        for endpoint in [
            &self.google_cloud.translation_endpoint,
            &self.google_cloud.vision_endpoint,
            &self.google_cloud.speech_endpoint,
            &self.google_cloud.text_to_speech_endpoint,
        ] {
            url::Url::parse(endpoint)
                .with_context(|| format!("Invalid Google Cloud endpoint: {}", endpoint))?;
        }

        let pagination = &self.pagination;
        if pagination.max_page_size == 0
            || pagination.default_page_size == 0
            || pagination.default_page_size > pagination.max_page_size
        {
            return Err(anyhow!(
                "pagination.default_page_size must be between 1 and pagination.max_page_size"
            ));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            google_cloud: GoogleCloudConfig::default(),
            pagination: PaginationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Random alphanumeric secret of the given length
pub fn generate_secret(length: usize) -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
