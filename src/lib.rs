/*!
 * # Polyglot - per-record attribute translation
 *
 * A Rust library that gives a record type a set of translatable attributes.
 * Values are stored one row per language and read back through a
 * configurable fallback chain.
 *
 * ## Features
 *
 * - Reads resolve through a fallback chain (single language, regional
 *   rule, or an ordered per-language map) that never loops
 * - Writes go to the active language or to several languages at once
 * - Translations are loaded lazily and cached per record instance
 * - Saving skips untouched languages and, optionally, translations that
 *   only repeat their fallback
 * - Deletion either removes all translations or refuses while more than
 *   one exists
 * - SQLite storage adapter with schema generation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `language_utils`: Language tag normalization and ISO 639 lookups
 * - `fallback`: Fallback configuration and next-language resolution
 * - `store`: Contract between the engine, the base record and storage
 * - `translation`: The translation engine:
 *   - `translation::core`: Attribute reads, writes and lifecycle hooks
 *   - `translation::record`: One language's values with change tracking
 *   - `translation::cache`: Per-instance cache of loaded languages
 *   - `translation::persistence`: Saving cached translations
 *   - `translation::deletion`: Deletion policy
 * - `database`: SQLite storage adapter
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod fallback;
pub mod language_utils;
pub mod store;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, DeleteHook, DeletionMode, TranslateableConfig};
pub use database::{Repository, StoredRecord};
pub use errors::{ConfigError, StoreError};
pub use fallback::{FallbackConfig, FallbackMap};
pub use store::{BaseRecord, LinkField, LinkValues, Relation, TranslationStore, TranslationTable};
pub use translation::{AttributeWrite, DeletionOutcome, PropertyAccess, Translateable, TranslationRecord};
