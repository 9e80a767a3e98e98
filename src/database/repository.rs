/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 * Ownership checks live in the service layer; the repository only
 * scopes list queries by owner.
 */

use anyhow::Result;
use log::debug;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use std::str::FromStr;

use super::connection::DatabaseConnection;
use super::models::{
    FolderRecord, HistoryEntry, PageRequest, Paged, SavedItemDetails, SavedItemFilter,
    SavedItemRecord, TranslationRecord, UserRecord,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at, \
     last_login, preferred_source_lang, preferred_target_lang, settings";

const TRANSLATION_COLUMNS: &str = "t.id, t.user_id, t.source_text, t.target_text, t.source_lang, \
     t.target_lang, t.input_type, t.is_favorite, t.tags, t.created_at";

const FOLDER_COLUMNS: &str = "id, user_id, name, parent_folder_id, created_at";

const SAVED_ITEM_SELECT: &str = r#"
    SELECT s.id, s.user_id, s.translation_id, s.category, s.folder_id, s.name, s.notes, s.created_at,
           t.id, t.user_id, t.source_text, t.target_text, t.source_lang,
           t.target_lang, t.input_type, t.is_favorite, t.tags, t.created_at,
           f.name
    FROM saved_items s
    JOIN translations t ON t.id = s.translation_id
    LEFT JOIN folders f ON f.id = s.folder_id
"#;

/// Parse a text column through `FromStr`
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e: anyhow::Error| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        last_login: row.get(6)?,
        preferred_source_lang: row.get(7)?,
        preferred_target_lang: row.get(8)?,
        settings: row.get(9)?,
    })
}

/// Map ten translation columns starting at `offset`
fn translation_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<TranslationRecord> {
    Ok(TranslationRecord {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        source_text: row.get(offset + 2)?,
        target_text: row.get(offset + 3)?,
        source_lang: row.get(offset + 4)?,
        target_lang: row.get(offset + 5)?,
        input_type: parse_column(row, offset + 6)?,
        is_favorite: row.get(offset + 7)?,
        tags: row.get(offset + 8)?,
        created_at: row.get(offset + 9)?,
    })
}

fn folder_from_row(row: &Row<'_>) -> rusqlite::Result<FolderRecord> {
    Ok(FolderRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        parent_folder_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn saved_item_details_from_row(row: &Row<'_>) -> rusqlite::Result<SavedItemDetails> {
    Ok(SavedItemDetails {
        item: SavedItemRecord {
            id: row.get(0)?,
            user_id: row.get(1)?,
            translation_id: row.get(2)?,
            category: parse_column(row, 3)?,
            folder_id: row.get(4)?,
            name: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
        },
        translation: translation_from_row(row, 8)?,
        folder_name: row.get(18)?,
    })
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user
    pub async fn create_user(&self, user: &UserRecord) -> Result<()> {
        let user = user.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!(
                        "INSERT INTO users ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                        USER_COLUMNS
                    ),
                    params![
                        user.id,
                        user.username,
                        user.email,
                        user.password_hash,
                        user.created_at,
                        user.updated_at,
                        user.last_login,
                        user.preferred_source_lang,
                        user.preferred_target_lang,
                        user.settings,
                    ],
                )?;
                debug!("Created user {}", user.id);
                Ok(())
            })
            .await
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
                        [&user_id],
                        user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    /// Find a user by username or email, ignoring case
    pub async fn find_user_by_login(&self, username_or_email: &str) -> Result<Option<UserRecord>> {
        let login = username_or_email.to_string();

        self.db
            .execute_async(move |conn| {
                let user = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM users WHERE username = ?1 OR email = ?1 LIMIT 1",
                            USER_COLUMNS
                        ),
                        [&login],
                        user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await
    }

    /// Check whether a username is taken, ignoring case
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let username = username.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                    [&username],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Check whether an email is taken, ignoring case
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let email = email.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1)",
                    [&email],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Persist the mutable profile fields of a user
    pub async fn update_user_profile(&self, user: &UserRecord) -> Result<()> {
        let user = user.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    UPDATE users
                    SET preferred_source_lang = ?2, preferred_target_lang = ?3,
                        settings = ?4, updated_at = ?5
                    WHERE id = ?1
                    "#,
                    params![
                        user.id,
                        user.preferred_source_lang,
                        user.preferred_target_lang,
                        user.settings,
                        user.updated_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Record a successful login
    pub async fn record_login(&self, user_id: &str, timestamp: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let timestamp = timestamp.to_string();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE users SET last_login = ?2 WHERE id = ?1",
                    params![user_id, timestamp],
                )?;
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Translation Operations
    // =========================================================================

    /// Insert a new translation
    pub async fn create_translation(&self, translation: &TranslationRecord) -> Result<()> {
        let t = translation.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO translations (
                        id, user_id, source_text, target_text, source_lang,
                        target_lang, input_type, is_favorite, tags, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                    params![
                        t.id,
                        t.user_id,
                        t.source_text,
                        t.target_text,
                        t.source_lang,
                        t.target_lang,
                        t.input_type.to_string(),
                        t.is_favorite,
                        t.tags,
                        t.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a translation by ID
    pub async fn get_translation(&self, translation_id: &str) -> Result<Option<TranslationRecord>> {
        let translation_id = translation_id.to_string();

        self.db
            .execute_async(move |conn| {
                let translation = conn
                    .query_row(
                        &format!("SELECT {} FROM translations t WHERE t.id = ?1", TRANSLATION_COLUMNS),
                        [&translation_id],
                        |row| translation_from_row(row, 0),
                    )
                    .optional()?;
                Ok(translation)
            })
            .await
    }

    /// Page through a user's translations, newest first
    pub async fn list_history(&self, user_id: &str, page: PageRequest) -> Result<Paged<HistoryEntry>> {
        let user_id = user_id.to_string();

        self.db
            .execute_async(move |conn| {
                let total_elements: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM translations WHERE user_id = ?1",
                    [&user_id],
                    |row| row.get(0),
                )?;

                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {},
                           EXISTS(SELECT 1 FROM saved_items s
                                  WHERE s.translation_id = t.id AND s.user_id = t.user_id)
                    FROM translations t
                    WHERE t.user_id = ?1
                    ORDER BY t.created_at DESC, t.rowid DESC
                    LIMIT ?2 OFFSET ?3
                    "#,
                    TRANSLATION_COLUMNS
                ))?;

                let items = stmt
                    .query_map(params![user_id, page.size, page.offset()], |row| {
                        Ok(HistoryEntry {
                            translation: translation_from_row(row, 0)?,
                            is_saved: row.get(10)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(Paged {
                    items,
                    page: page.page,
                    size: page.size,
                    total_elements,
                })
            })
            .await
    }

    /// Whether the translation's owner has saved it
    pub async fn translation_is_saved(&self, user_id: &str, translation_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        let translation_id = translation_id.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM saved_items WHERE user_id = ?1 AND translation_id = ?2)",
                    params![user_id, translation_id],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Set the favorite flag, returning false when the translation is missing
    pub async fn set_translation_favorite(&self, translation_id: &str, favorite: bool) -> Result<bool> {
        let translation_id = translation_id.to_string();

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE translations SET is_favorite = ?2 WHERE id = ?1",
                    params![translation_id, favorite],
                )?;
                Ok(updated > 0)
            })
            .await
    }

    /// Delete a translation; saved items referencing it cascade
    pub async fn delete_translation(&self, translation_id: &str) -> Result<bool> {
        let translation_id = translation_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM translations WHERE id = ?1", [&translation_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // =========================================================================
    // Folder Operations
    // =========================================================================

    /// Insert a new folder
    pub async fn create_folder(&self, folder: &FolderRecord) -> Result<()> {
        let folder = folder.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    &format!("INSERT INTO folders ({}) VALUES (?1, ?2, ?3, ?4, ?5)", FOLDER_COLUMNS),
                    params![
                        folder.id,
                        folder.user_id,
                        folder.name,
                        folder.parent_folder_id,
                        folder.created_at,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    /// Get a folder by ID
    pub async fn get_folder(&self, folder_id: &str) -> Result<Option<FolderRecord>> {
        let folder_id = folder_id.to_string();

        self.db
            .execute_async(move |conn| {
                let folder = conn
                    .query_row(
                        &format!("SELECT {} FROM folders WHERE id = ?1", FOLDER_COLUMNS),
                        [&folder_id],
                        folder_from_row,
                    )
                    .optional()?;
                Ok(folder)
            })
            .await
    }

    /// List a user's folders directly under `parent` (root folders for `None`), newest first
    pub async fn list_folders(&self, user_id: &str, parent: Option<&str>) -> Result<Vec<FolderRecord>> {
        let user_id = user_id.to_string();
        let parent = parent.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {} FROM folders
                    WHERE user_id = ?1 AND parent_folder_id IS ?2
                    ORDER BY created_at DESC, rowid DESC
                    "#,
                    FOLDER_COLUMNS
                ))?;
                let folders = stmt
                    .query_map(params![user_id, parent], folder_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(folders)
            })
            .await
    }

    /// Whether `name` is already used by a sibling under `parent`
    pub async fn folder_name_exists(
        &self,
        user_id: &str,
        parent: Option<&str>,
        name: &str,
        exclude_folder_id: Option<&str>,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let parent = parent.map(str::to_string);
        let name = name.to_string();
        let exclude = exclude_folder_id.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    r#"
                    SELECT EXISTS(
                        SELECT 1 FROM folders
                        WHERE user_id = ?1 AND parent_folder_id IS ?2 AND name = ?3
                          AND (?4 IS NULL OR id != ?4)
                    )
                    "#,
                    params![user_id, parent, name, exclude],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Rename a folder
    pub async fn rename_folder(&self, folder_id: &str, name: &str) -> Result<bool> {
        let folder_id = folder_id.to_string();
        let name = name.to_string();

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE folders SET name = ?2 WHERE id = ?1",
                    params![folder_id, name],
                )?;
                Ok(updated > 0)
            })
            .await
    }

    /// Re-parent a folder (`None` moves it to the root)
    pub async fn set_folder_parent(&self, folder_id: &str, parent: Option<&str>) -> Result<bool> {
        let folder_id = folder_id.to_string();
        let parent = parent.map(str::to_string);

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE folders SET parent_folder_id = ?2 WHERE id = ?1",
                    params![folder_id, parent],
                )?;
                Ok(updated > 0)
            })
            .await
    }

    /// Number of direct subfolders
    pub async fn count_subfolders(&self, folder_id: &str) -> Result<i64> {
        let folder_id = folder_id.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM folders WHERE parent_folder_id = ?1",
                    [&folder_id],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// IDs of the folder and all of its ancestors, starting with the folder itself
    pub async fn folder_lineage(&self, folder_id: &str) -> Result<Vec<String>> {
        let folder_id = folder_id.to_string();

        self.db
            .execute_async(move |conn| {
                // Depth bound stops on a corrupt cyclic chain
                let mut stmt = conn.prepare(
                    r#"
                    WITH RECURSIVE lineage(id, parent_folder_id, depth) AS (
                        SELECT id, parent_folder_id, 0 FROM folders WHERE id = ?1
                        UNION
                        SELECT f.id, f.parent_folder_id, l.depth + 1
                        FROM folders f JOIN lineage l ON f.id = l.parent_folder_id
                        WHERE l.depth < 10000
                    )
                    SELECT id FROM lineage ORDER BY depth
                    "#,
                )?;
                let ids = stmt
                    .query_map([&folder_id], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<String>>>()?;
                Ok(ids)
            })
            .await
    }

    /// Delete a folder
    pub async fn delete_folder(&self, folder_id: &str) -> Result<bool> {
        let folder_id = folder_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM folders WHERE id = ?1", [&folder_id])?;
                Ok(deleted > 0)
            })
            .await
    }

    // =========================================================================
    // Saved Item Operations
    // =========================================================================

    /// Insert a saved item and mark its translation favorite in one transaction
    pub async fn create_saved_item(&self, item: &SavedItemRecord) -> Result<()> {
        let item = item.clone();

        self.db
            .transaction_async(move |tx| {
                tx.execute(
                    r#"
                    INSERT INTO saved_items (
                        id, user_id, translation_id, category, folder_id, name, notes, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    "#,
                    params![
                        item.id,
                        item.user_id,
                        item.translation_id,
                        item.category.to_string(),
                        item.folder_id,
                        item.name,
                        item.notes,
                        item.created_at,
                    ],
                )?;

                tx.execute(
                    "UPDATE translations SET is_favorite = 1 WHERE id = ?1 AND is_favorite = 0",
                    [&item.translation_id],
                )?;

                debug!("Saved translation {} as item {}", item.translation_id, item.id);
                Ok(())
            })
            .await
    }

    /// Get a saved item with its translation and folder name
    pub async fn get_saved_item(&self, item_id: &str) -> Result<Option<SavedItemDetails>> {
        let item_id = item_id.to_string();

        self.db
            .execute_async(move |conn| {
                let details = conn
                    .query_row(
                        &format!("{} WHERE s.id = ?1", SAVED_ITEM_SELECT),
                        [&item_id],
                        saved_item_details_from_row,
                    )
                    .optional()?;
                Ok(details)
            })
            .await
    }

    /// Whether the user already saved this translation
    pub async fn saved_item_exists(&self, user_id: &str, translation_id: &str) -> Result<bool> {
        let user_id = user_id.to_string();
        let translation_id = translation_id.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM saved_items WHERE user_id = ?1 AND translation_id = ?2)",
                    params![user_id, translation_id],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Page through a user's saved items, newest first
    pub async fn list_saved_items(
        &self,
        user_id: &str,
        filter: &SavedItemFilter,
        page: PageRequest,
    ) -> Result<Paged<SavedItemDetails>> {
        let mut conditions = vec!["s.user_id = ?".to_string()];
        let mut values = vec![Value::Text(user_id.to_string())];

        if let Some(category) = filter.category {
            conditions.push("s.category = ?".to_string());
            values.push(Value::Text(category.to_string()));
        }
        if let Some(folder_id) = &filter.folder_id {
            conditions.push("s.folder_id = ?".to_string());
            values.push(Value::Text(folder_id.clone()));
        }
        if let Some(favorite) = filter.favorite {
            conditions.push("t.is_favorite = ?".to_string());
            values.push(Value::Integer(i64::from(favorite)));
        }

        let where_clause = conditions.join(" AND ");

        self.db
            .execute_async(move |conn| {
                let total_elements: i64 = conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM saved_items s JOIN translations t ON t.id = s.translation_id WHERE {}",
                        where_clause
                    ),
                    params_from_iter(values.iter()),
                    |row| row.get(0),
                )?;

                let mut paged_values = values;
                paged_values.push(Value::Integer(i64::from(page.size)));
                paged_values.push(Value::Integer(page.offset()));

                let mut stmt = conn.prepare(&format!(
                    "{} WHERE {} ORDER BY s.created_at DESC, s.rowid DESC LIMIT ? OFFSET ?",
                    SAVED_ITEM_SELECT, where_clause
                ))?;
                let items = stmt
                    .query_map(params_from_iter(paged_values.iter()), saved_item_details_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(Paged {
                    items,
                    page: page.page,
                    size: page.size,
                    total_elements,
                })
            })
            .await
    }

    /// Number of saved items filed directly in a folder
    pub async fn count_items_in_folder(&self, folder_id: &str) -> Result<i64> {
        let folder_id = folder_id.to_string();

        self.db
            .execute_async(move |conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM saved_items WHERE folder_id = ?1",
                    [&folder_id],
                    |row| row.get(0),
                )?)
            })
            .await
    }

    /// Persist the mutable fields of a saved item (name, notes, folder)
    pub async fn update_saved_item(&self, item: &SavedItemRecord) -> Result<()> {
        let item = item.clone();

        self.db
            .execute_async(move |conn| {
                conn.execute(
                    "UPDATE saved_items SET name = ?2, notes = ?3, folder_id = ?4 WHERE id = ?1",
                    params![item.id, item.name, item.notes, item.folder_id],
                )?;
                Ok(())
            })
            .await
    }

    /// Delete a saved item; the translation and its favorite flag stay
    pub async fn delete_saved_item(&self, item_id: &str) -> Result<bool> {
        let item_id = item_id.to_string();

        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM saved_items WHERE id = ?1", [&item_id])?;
                Ok(deleted > 0)
            })
            .await
    }
}
