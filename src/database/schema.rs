/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for all database tables
 * and refuses databases written with a different schema version.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Per-connection settings; SQLite does not persist `foreign_keys`
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")
        .context("Failed to enable foreign keys")?;
    Ok(())
}

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    configure_connection(conn)?;

    let current_version = get_schema_version(conn)?;

    match current_version {
        0 => {
            info!("Initializing database schema v{}", SCHEMA_VERSION);
            create_all_tables(conn)?;
            set_schema_version(conn, SCHEMA_VERSION)?;
        }
        SCHEMA_VERSION => debug!("Database schema is up to date (v{})", current_version),
        other => {
            return Err(anyhow!(
                "Unsupported database schema v{} (this build uses v{})",
                other,
                SCHEMA_VERSION
            ));
        }
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL is ignored for in-memory databases
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL COLLATE NOCASE UNIQUE,
            email TEXT NOT NULL COLLATE NOCASE UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login TEXT,
            preferred_source_lang TEXT,
            preferred_target_lang TEXT,
            settings TEXT
        );
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS translations (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            source_text TEXT NOT NULL,
            target_text TEXT NOT NULL,
            source_lang TEXT NOT NULL,
            target_lang TEXT NOT NULL,
            input_type TEXT NOT NULL,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            tags TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_translations_user_created ON translations(user_id, created_at);
        "#,
    )?;

    // Root folders have a NULL parent, so uniqueness goes through COALESCE
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS folders (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            parent_folder_id TEXT REFERENCES folders(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_folders_unique_name
            ON folders(user_id, COALESCE(parent_folder_id, ''), name);
        CREATE INDEX IF NOT EXISTS idx_folders_parent ON folders(parent_folder_id);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS saved_items (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            translation_id TEXT NOT NULL REFERENCES translations(id) ON DELETE CASCADE,
            category TEXT NOT NULL,
            folder_id TEXT REFERENCES folders(id) ON DELETE SET NULL,
            name TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, translation_id)
        );

        CREATE INDEX IF NOT EXISTS idx_saved_items_user_created ON saved_items(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_saved_items_folder ON saved_items(folder_id);
        "#,
    )?;

    info!("Database schema created successfully");
    Ok(())
}
