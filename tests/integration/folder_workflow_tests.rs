/*!
 * Folder hierarchy rules through FolderService
 */

use rosetta::database::models::SavedItemCategory;
use rosetta::errors::AppError;
use rosetta::services::NewSavedItem;

use crate::common::TestLibrary;

#[tokio::test]
async fn test_createFolder_withDuplicateSiblingName_shouldConflict() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;

    let travel = library.folders.create_folder(&user.id, "Travel", None).await.unwrap();
    let duplicate_root = library.folders.create_folder(&user.id, "Travel", None).await;
    let nested = library
        .folders
        .create_folder(&user.id, "Travel", Some(&travel.id))
        .await;

    assert!(matches!(duplicate_root, Err(AppError::Conflict(_))));
    assert!(nested.is_ok(), "same name under a different parent is allowed");
}

#[tokio::test]
async fn test_createFolder_withSameNameForOtherUser_shouldSucceed() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;

    library.folders.create_folder(&alice.id, "Work", None).await.unwrap();

    assert!(library.folders.create_folder(&bob.id, "Work", None).await.is_ok());
}

#[tokio::test]
async fn test_createFolder_withInvalidNameOrForeignParent_shouldFail() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;
    let bobs = library.folders.create_folder(&bob.id, "Private", None).await.unwrap();

    assert!(matches!(
        library.folders.create_folder(&alice.id, "  ", None).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        library.folders.create_folder(&alice.id, &"n".repeat(101), None).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        library.folders.create_folder(&alice.id, "Mine", Some(&bobs.id)).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        library.folders.create_folder(&alice.id, "Mine", Some("missing")).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_listFolders_shouldSeparateRootsFromChildren() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let languages = library.folders.create_folder(&user.id, "Languages", None).await.unwrap();
    library.folders.create_folder(&user.id, "Recipes", None).await.unwrap();
    library
        .folders
        .create_folder(&user.id, "Spanish", Some(&languages.id))
        .await
        .unwrap();

    let roots = library.folders.root_folders(&user.id).await.unwrap();
    let children = library.folders.sub_folders(&user.id, &languages.id).await.unwrap();

    let mut root_names: Vec<_> = roots.iter().map(|f| f.name.as_str()).collect();
    root_names.sort_unstable();
    assert_eq!(root_names, vec!["Languages", "Recipes"]);
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Spanish");
    assert_eq!(children[0].parent_folder_id.as_deref(), Some(languages.id.as_str()));
}

#[tokio::test]
async fn test_renameFolder_shouldAllowSameNameAndRejectSiblingName() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let travel = library.folders.create_folder(&user.id, "Travel", None).await.unwrap();
    library.folders.create_folder(&user.id, "Work", None).await.unwrap();

    let unchanged = library.folders.rename_folder(&user.id, &travel.id, "Travel").await.unwrap();
    let clash = library.folders.rename_folder(&user.id, &travel.id, "Work").await;
    let renamed = library.folders.rename_folder(&user.id, &travel.id, " Trips ").await.unwrap();

    assert_eq!(unchanged.name, "Travel");
    assert!(matches!(clash, Err(AppError::Conflict(_))));
    assert_eq!(renamed.name, "Trips");
    assert_eq!(library.folders.get_owned(&user.id, &travel.id).await.unwrap().name, "Trips");
}

#[tokio::test]
async fn test_moveFolder_intoOwnDescendant_shouldBeRejected() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let top = library.folders.create_folder(&user.id, "Top", None).await.unwrap();
    let middle = library.folders.create_folder(&user.id, "Middle", Some(&top.id)).await.unwrap();
    let bottom = library
        .folders
        .create_folder(&user.id, "Bottom", Some(&middle.id))
        .await
        .unwrap();

    let into_self = library.folders.move_folder(&user.id, &top.id, Some(&top.id)).await;
    let into_grandchild = library.folders.move_folder(&user.id, &top.id, Some(&bottom.id)).await;

    assert!(matches!(into_self, Err(AppError::InvalidInput(_))));
    assert!(matches!(into_grandchild, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_moveFolder_toRootAndBack_shouldUpdateParent() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let top = library.folders.create_folder(&user.id, "Top", None).await.unwrap();
    let child = library.folders.create_folder(&user.id, "Child", Some(&top.id)).await.unwrap();

    let at_root = library.folders.move_folder(&user.id, &child.id, None).await.unwrap();
    assert_eq!(at_root.parent_folder_id, None);
    assert_eq!(library.folders.root_folders(&user.id).await.unwrap().len(), 2);

    let back = library.folders.move_folder(&user.id, &child.id, Some(&top.id)).await.unwrap();
    assert_eq!(back.parent_folder_id.as_deref(), Some(top.id.as_str()));
    assert_eq!(library.folders.sub_folders(&user.id, &top.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_moveFolder_withNameTakenAtDestination_shouldConflict() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let top = library.folders.create_folder(&user.id, "Top", None).await.unwrap();
    library.folders.create_folder(&user.id, "Notes", None).await.unwrap();
    let nested_notes = library.folders.create_folder(&user.id, "Notes", Some(&top.id)).await.unwrap();

    let result = library.folders.move_folder(&user.id, &nested_notes.id, None).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_deleteFolder_shouldRequireEmptyFolder() {
    let library = TestLibrary::new();
    let user = library.create_user("alice").await;
    let parent = library.folders.create_folder(&user.id, "Parent", None).await.unwrap();
    let child = library.folders.create_folder(&user.id, "Child", Some(&parent.id)).await.unwrap();
    let translation = library.create_translation(&user.id, "hello").await;
    let item = library
        .saved_items
        .create(
            &user.id,
            NewSavedItem {
                translation_id: translation.id.clone(),
                category: SavedItemCategory::Word,
                folder_id: Some(child.id.clone()),
                name: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        library.folders.delete_folder(&user.id, &parent.id).await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        library.folders.delete_folder(&user.id, &child.id).await,
        Err(AppError::InvalidInput(_))
    ));

    library.saved_items.delete(&user.id, &item.item.id).await.unwrap();
    library.folders.delete_folder(&user.id, &child.id).await.unwrap();
    library.folders.delete_folder(&user.id, &parent.id).await.unwrap();

    assert!(library.folders.root_folders(&user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleteFolder_byOtherUser_shouldBeForbidden() {
    let library = TestLibrary::new();
    let alice = library.create_user("alice").await;
    let bob = library.create_user("bob").await;
    let folder = library.folders.create_folder(&alice.id, "Mine", None).await.unwrap();

    assert!(matches!(
        library.folders.delete_folder(&bob.id, &folder.id).await,
        Err(AppError::Forbidden(_))
    ));
}
