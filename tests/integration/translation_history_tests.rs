/*!
 * Translation history, favorites and deletion through TranslationService
 */

use rosetta::database::models::{InputType, PageRequest, SavedItemCategory};
use rosetta::errors::AppError;
use rosetta::services::{NewSavedItem, NewTranslation};

use crate::common::TestLibrary;

#[tokio::test]
async fn test_saveTranslation_shouldNormalizeAndValidate() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;

    let saved = library
        .translations
        .save_translation(
            &user.id,
            NewTranslation {
                source_text: "  Hello  ".to_string(),
                target_text: "Hola".to_string(),
                source_lang: "AUTO".to_string(),
                target_lang: "es-mx".to_string(),
                input_type: InputType::Speech,
                tags: Some(r#"["greeting"]"#.to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(saved.source_text, "Hello");
    assert_eq!(saved.source_lang, "auto");
    assert_eq!(saved.target_lang, "es-MX");
    assert!(!saved.is_favorite);

    let invalid_tags = library
        .translations
        .save_translation(
            &user.id,
            NewTranslation {
                source_text: "Hello".to_string(),
                target_text: "Hola".to_string(),
                source_lang: "en".to_string(),
                target_lang: "es".to_string(),
                input_type: InputType::Text,
                tags: Some("[unclosed".to_string()),
            },
        )
        .await;
    assert!(matches!(invalid_tags, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_saveTranslation_withBlankText_shouldBeInvalidInput() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;

    let result = library
        .translations
        .save_translation(
            &user.id,
            NewTranslation {
                source_text: "   ".to_string(),
                target_text: "Hola".to_string(),
                source_lang: "en".to_string(),
                target_lang: "es".to_string(),
                input_type: InputType::Text,
                tags: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_history_shouldBeNewestFirstAndScopedToUser() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;

    for text in ["one", "two", "three"] {
        library.create_translation(&alice.id, text).await;
    }
    library.create_translation(&bob.id, "bob's").await;

    let first_page = library
        .translations
        .history(&alice.id, PageRequest { page: 0, size: 2 })
        .await
        .unwrap();

    assert_eq!(first_page.total_elements, 3);
    assert_eq!(first_page.total_pages(), 2);
    let texts: Vec<_> = first_page
        .items
        .iter()
        .map(|entry| entry.translation.source_text.as_str())
        .collect();
    assert_eq!(texts, vec!["three", "two"]);

    let second_page = library
        .translations
        .history(&alice.id, PageRequest { page: 1, size: 2 })
        .await
        .unwrap();
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].translation.source_text, "one");
}

#[tokio::test]
async fn test_toggleFavorite_shouldFlipAndEnforceOwnership() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;
    let translation = library.create_translation(&alice.id, "hello").await;

    let on = library.translations.toggle_favorite(&alice.id, &translation.id).await.unwrap();
    let off = library.translations.toggle_favorite(&alice.id, &translation.id).await.unwrap();

    assert!(on.translation.is_favorite);
    assert!(!off.translation.is_favorite);
    assert!(matches!(
        library.translations.toggle_favorite(&bob.id, &translation.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        library.translations.toggle_favorite(&alice.id, "missing").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleteTranslation_shouldRemoveSavedItemsToo() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let translation = library.create_translation(&alice.id, "hello").await;
    let item = library
        .saved_items
        .create(
            &alice.id,
            NewSavedItem {
                translation_id: translation.id.clone(),
                category: SavedItemCategory::Phrase,
                folder_id: None,
                name: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    library.translations.delete_translation(&alice.id, &translation.id).await.unwrap();

    assert!(matches!(
        library.saved_items.get(&alice.id, &item.item.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        library.translations.delete_translation(&alice.id, &translation.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_deleteTranslation_byOtherUser_shouldBeForbidden() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;
    let translation = library.create_translation(&alice.id, "hello").await;

    let result = library.translations.delete_translation(&bob.id, &translation.id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert!(library.translations.get_owned(&alice.id, &translation.id).await.is_ok());
}
