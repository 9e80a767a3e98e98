/*!
 * SQLite connection shared by the repository.
 *
 * One connection sits behind a mutex; async callers reach it through
 * `spawn_blocking` so queries never stall the runtime.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

const DEFAULT_DB_DIRNAME: &str = "rosetta";
const DEFAULT_DB_FILENAME: &str = "rosetta.db";
const IN_MEMORY_PATH: &str = ":memory:";

/// Shared SQLite connection
#[derive(Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database in the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the database file at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {}", parent.display()))?;
        }

        info!("Opening database at {}", db_path.display());
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        Self::from_connection(conn, db_path)
    }

    /// Private in-memory database, used by tests
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");
        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;
        Self::from_connection(conn, PathBuf::from(IN_MEMORY_PATH))
    }

    fn from_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/rosetta/rosetta.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run `f` on the calling thread
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        f(&*conn)
    }

    /// Run `f` on the blocking pool
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || f(&*conn.lock()))
            .await
            .context("Database task panicked")?
    }

    /// Run `f` inside a transaction on the blocking pool
    ///
    /// Nothing is committed when `f` fails.
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();
            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Row counts of the main tables
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let count = |table: &str| -> Result<i64> {
                Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?)
            };

            Ok(DatabaseStats {
                user_count: count("users")?,
                translation_count: count("translations")?,
                folder_count: count("folders")?,
                saved_item_count: count("saved_items")?,
            })
        })
    }
}

/// Row counts per table
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub user_count: i64,
    pub translation_count: i64,
    pub folder_count: i64,
    pub saved_item_count: i64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Users: {}, Translations: {}, Folders: {}, Saved items: {}",
            self.user_count, self.translation_count, self.folder_count, self.saved_item_count
        )
    }
}
