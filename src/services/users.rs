/*!
 * User accounts: registration, login and profile management.
 */

use log::{debug, info};

use super::{language_code, required_text};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::JwtTokenProvider;
use crate::database::models::{now_timestamp, UserRecord};
use crate::database::Repository;
use crate::errors::{AppError, AppResult};

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 8;

/// Message for any failed login, so callers cannot discover which accounts exist
const INVALID_CREDENTIALS: &str = "Invalid username/email or password";

/// Preferred languages; `None` clears a preference
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

/// Profile changes; absent sections are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub preferences: Option<Preferences>,
    /// Raw JSON document
    pub settings: Option<String>,
}

/// Account management service
#[derive(Clone)]
pub struct UserService {
    repo: Repository,
    tokens: JwtTokenProvider,
}

impl UserService {
    pub fn new(repo: Repository, tokens: JwtTokenProvider) -> Self {
        Self { repo, tokens }
    }

    /// Create an account
    pub async fn register(&self, username: &str, email: &str, password: &str) -> AppResult<UserRecord> {
        let username = validate_username(username)?;
        let email = validate_email(email)?;
        if password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {} characters",
                PASSWORD_MIN_CHARS
            )));
        }

        if self.repo.username_exists(&username).await? {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        if self.repo.email_exists(&email).await? {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let user = UserRecord::new(username, email, password_hash);
        self.repo.create_user(&user).await?;
        info!("Registered user {} ({})", user.username, user.id);

        Ok(user)
    }

    /// Check credentials and issue an access token
    pub async fn login(&self, username_or_email: &str, password: &str) -> AppResult<(UserRecord, String)> {
        let login = username_or_email.trim();
        let Some(mut user) = self.repo.find_user_by_login(login).await? else {
            debug!("Login attempt for unknown account '{}'", login);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash)).await?;
        if !valid {
            debug!("Wrong password for user {}", user.id);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let now = now_timestamp();
        self.repo.record_login(&user.id, &now).await?;
        user.last_login = Some(now);

        let token = self.tokens.generate_token(&user.id)?;
        Ok((user, token))
    }

    /// Load a user
    pub async fn get_user(&self, user_id: &str) -> AppResult<UserRecord> {
        self.repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// Apply profile changes and return the updated user
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AppResult<UserRecord> {
        let mut user = self.get_user(user_id).await?;

        if let Some(preferences) = update.preferences {
            user.preferred_source_lang = optional_language(preferences.source_lang, true)?;
            user.preferred_target_lang = optional_language(preferences.target_lang, false)?;
        }

        if let Some(settings) = update.settings {
            serde_json::from_str::<serde_json::Value>(&settings)
                .map_err(|e| AppError::InvalidInput(format!("Settings must be valid JSON: {}", e)))?;
            user.settings = Some(settings);
        }

        user.updated_at = now_timestamp();
        self.repo.update_user_profile(&user).await?;

        Ok(user)
    }
}

fn validate_username(username: &str) -> AppResult<String> {
    let username = username.trim();
    let length = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
        return Err(AppError::InvalidInput(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AppError::InvalidInput(
            "Username may only contain letters, digits, '_', '.' and '-'".to_string(),
        ));
    }
    Ok(username.to_string())
}

fn validate_email(email: &str) -> AppResult<String> {
    let email = required_text(email, "Email")?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => Ok(email),
        _ => Err(AppError::InvalidInput("Email address is not valid".to_string())),
    }
}

fn optional_language(code: Option<String>, allow_auto: bool) -> AppResult<Option<String>> {
    match code {
        Some(code) if !code.trim().is_empty() => language_code(&code, allow_auto).map(Some),
        _ => Ok(None),
    }
}
