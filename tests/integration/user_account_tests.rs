/*!
 * Registration, login and profile management through UserService
 */

use rosetta::auth::JwtTokenProvider;
use rosetta::errors::AppError;
use rosetta::services::{Preferences, ProfileUpdate, UserService};

use crate::common;

fn create_user_service() -> UserService {
    common::init_logging();
    let config = common::test_config();
    UserService::new(common::create_test_repo(), JwtTokenProvider::from_config(&config.auth))
}

#[tokio::test]
async fn test_register_thenLogin_shouldIssueTokenForUser() {
    let users = create_user_service();

    let user = users
        .register(" alice ", "alice@example.com", "password123")
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert_ne!(user.password_hash, "password123");

    let (logged_in, token) = users.login("ALICE@example.com", "password123").await.unwrap();
    assert_eq!(logged_in.id, user.id);
    assert!(logged_in.last_login.is_some());
    assert!(!token.is_empty());

    let stored = users.get_user(&user.id).await.unwrap();
    assert_eq!(stored.last_login, logged_in.last_login);
}

#[tokio::test]
async fn test_register_withDuplicateUsernameOrEmail_shouldConflict() {
    let users = create_user_service();
    users.register("bob", "bob@example.com", "password123").await.unwrap();

    let same_name = users.register("BOB", "other@example.com", "password123").await;
    let same_email = users.register("robert", "Bob@Example.com", "password123").await;

    assert!(matches!(same_name, Err(AppError::Conflict(_))));
    assert!(matches!(same_email, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_register_withInvalidInput_shouldBeRejectedBeforeHashing() {
    let users = create_user_service();

    assert!(matches!(
        users.register("ab", "ab@example.com", "password123").await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        users.register("carol", "carol.example.com", "password123").await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        users.register("carol", "carol@example.com", "short").await,
        Err(AppError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_login_withWrongPasswordOrUnknownUser_shouldGiveSameUnauthorized() {
    let users = create_user_service();
    users.register("dave", "dave@example.com", "password123").await.unwrap();

    let wrong_password = users.login("dave", "password124").await.unwrap_err();
    let unknown_user = users.login("nobody", "password123").await.unwrap_err();

    assert!(matches!(wrong_password, AppError::Unauthorized(_)));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
}

#[tokio::test]
async fn test_updateProfile_shouldReplacePreferencesAndSettings() {
    let users = create_user_service();
    let user = users.register("erin", "erin@example.com", "password123").await.unwrap();

    let updated = users
        .update_profile(
            &user.id,
            ProfileUpdate {
                preferences: Some(Preferences {
                    source_lang: Some("auto".to_string()),
                    target_lang: Some("PT-br".to_string()),
                }),
                settings: Some(r#"{"theme":"dark"}"#.to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.preferred_source_lang.as_deref(), Some("auto"));
    assert_eq!(updated.preferred_target_lang.as_deref(), Some("pt-BR"));
    assert_eq!(updated.settings.as_deref(), Some(r#"{"theme":"dark"}"#));

    let cleared = users
        .update_profile(
            &user.id,
            ProfileUpdate {
                preferences: Some(Preferences::default()),
                settings: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(cleared.preferred_target_lang, None);
    assert_eq!(cleared.settings.as_deref(), Some(r#"{"theme":"dark"}"#));
}

#[tokio::test]
async fn test_updateProfile_withInvalidSettingsOrLanguage_shouldBeInvalidInput() {
    let users = create_user_service();
    let user = users.register("frank", "frank@example.com", "password123").await.unwrap();

    let bad_settings = users
        .update_profile(
            &user.id,
            ProfileUpdate {
                preferences: None,
                settings: Some("{not json".to_string()),
            },
        )
        .await;
    let bad_language = users
        .update_profile(
            &user.id,
            ProfileUpdate {
                preferences: Some(Preferences {
                    source_lang: None,
                    target_lang: Some("12".to_string()),
                }),
                settings: None,
            },
        )
        .await;

    assert!(matches!(bad_settings, Err(AppError::InvalidInput(_))));
    assert!(matches!(bad_language, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_getUser_withUnknownId_shouldBeNotFound() {
    let users = create_user_service();
    assert!(matches!(users.get_user("missing").await, Err(AppError::NotFound(_))));
}
