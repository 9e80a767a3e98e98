/*!
 * Database module for persistent storage.
 *
 * This module provides SQLite-based persistence for:
 * - User accounts and preferences
 * - Translation history and favorites
 * - Folders and saved items
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::DatabaseConnection;
pub use repository::Repository;
