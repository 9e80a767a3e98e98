/*!
 * Tests for configuration loading, overrides and validation
 */

use std::collections::HashMap;

use rosetta::app_config::{generate_secret, Config, LogLevel, MAX_RETRY_COUNT, MIN_JWT_SECRET_BYTES};

use crate::common;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_default_shouldUseDocumentedValues() {
    let config = Config::default();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.auth.jwt_expiration_ms, 86_400_000);
    assert_eq!(config.google_cloud.location, "global");
    assert_eq!(config.pagination.default_page_size, 20);
    assert_eq!(config.pagination.max_page_size, 100);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withTestConfig_shouldPass() {
    assert!(common::test_config().validate().is_ok());
}

#[test]
fn test_validate_withShortSecret_shouldFail() {
    let mut config = common::test_config();
    config.auth.jwt_secret = "short".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withoutCredentials_shouldFail() {
    let mut config = common::test_config();
    config.google_cloud.api_key.clear();
    config.google_cloud.credentials_base64.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withoutProject_shouldFail() {
    let mut config = common::test_config();
    config.google_cloud.project_id = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withServiceAccountAndNoProject_shouldPass() {
    let mut config = common::test_config();
    config.google_cloud.project_id.clear();
    config.google_cloud.api_key.clear();
    config.google_cloud.credentials_base64 = "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50In0=".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withTooManyRetries_shouldFail() {
    let mut config = common::test_config();
    config.google_cloud.retry_count = MAX_RETRY_COUNT;
    assert!(config.validate().is_ok());

    config.google_cloud.retry_count = 64;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBadEndpoint_shouldFail() {
    let mut config = common::test_config();
    config.google_cloud.vision_endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_applyOverridesFrom_shouldReplaceConfiguredValues() {
    let mut config = Config::default();

    config
        .apply_overrides_from(lookup_from(&[
            ("ROSETTA_HOST", "0.0.0.0"),
            ("ROSETTA_PORT", "9090"),
            ("ROSETTA_DB_PATH", "/tmp/rosetta.db"),
            ("JWT_EXPIRATION_MS", "60000"),
            ("GOOGLE_CLOUD_PROJECT_ID", "env-project"),
            ("GOOGLE_CLOUD_API_KEY", "env-key"),
            ("ROSETTA_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

    assert_eq!(config.server.bind_address(), "0.0.0.0:9090");
    assert_eq!(config.database.path.as_deref(), Some("/tmp/rosetta.db"));
    assert_eq!(config.auth.jwt_expiration_ms, 60_000);
    assert_eq!(config.google_cloud.project_id, "env-project");
    assert_eq!(config.google_cloud.api_key, "env-key");
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_applyOverridesFrom_withBadPort_shouldFail() {
    let mut config = Config::default();
    assert!(config
        .apply_overrides_from(lookup_from(&[("ROSETTA_PORT", "eighty")]))
        .is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaultsWithSecret() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());
    assert!(created.auth.jwt_secret.len() >= MIN_JWT_SECRET_BYTES);

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.auth.jwt_secret, created.auth.jwt_secret);
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{"server": {"port": 7000}}"#).unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.server.port, 7000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.google_cloud.retry_count, 3);
}

#[test]
fn test_generateSecret_shouldBeAlphanumericOfRequestedLength() {
    let secret = generate_secret(48);
    assert_eq!(secret.len(), 48);
    assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(secret, generate_secret(48));
}

#[test]
fn test_logLevel_fromStr_shouldAcceptAliases() {
    assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert!("loud".parse::<LogLevel>().is_err());
}
