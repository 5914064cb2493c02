/*!
 * Database module for persistent storage of base records and translations.
 *
 * This module provides SQLite-based persistence for:
 * - Base records with an integer identity
 * - Translation rows linked to them, one per language
 * - Schema creation from the translation settings
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::StoredRecord;
pub use repository::Repository;
