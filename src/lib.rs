/*!
 * # Rosetta - personal translation assistant backend
 *
 * An HTTP service where authenticated users translate text, read text out of
 * images, transcribe speech and synthesize audio through Google Cloud, and
 * keep their results in a personal library.
 *
 * ## Features
 *
 * - Account registration and login with signed access tokens
 * - Translation, OCR, speech-to-text and text-to-speech via Google Cloud
 * - Translation history with favorites
 * - Hierarchical folders and saved items
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Wires storage, provider and HTTP server
 * - `auth`: Password hashing and access tokens
 * - `database`: SQLite schema, connection and repository
 * - `services`: Validation, ownership checks and orchestration
 * - `providers`: Cloud provider clients:
 *   - `providers::google`: Google Cloud REST client
 *   - `providers::mock`: In-process provider for tests
 * - `server`: axum router, handlers and middleware
 * - `language_utils`: Language tag utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod auth;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod server;
pub mod services;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use database::{DatabaseConnection, Repository};
pub use errors::{AppError, AppResult, ProviderError};
pub use language_utils::{get_language_name, normalize_language_tag};
pub use providers::Provider;
