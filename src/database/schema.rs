/*!
 * Database schema definitions.
 *
 * Tables are generated from the translation settings: a base table with an
 * integer key, and a translation table with the link columns, the language
 * column and one column per translatable attribute. Attribute columns added
 * to the settings later are added to an existing table.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

use crate::app_config::{TranslateableConfig, check_identifier};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Create or extend the tables for a base table and its translations
pub fn initialize_schema(conn: &Connection, base_table: &str, config: &TranslateableConfig) -> Result<()> {
    check_identifier(base_table)?;
    config.validate()?;

    let current_version = get_schema_version(conn)?;
    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_version_table(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        debug!("Database schema is at v{}", current_version);
    }

    create_base_table(conn, base_table)?;
    create_translation_table(conn, config)?;
    add_missing_attribute_columns(conn, config)?;
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

fn create_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_base_table(conn: &Connection, base_table: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
        table = base_table
    ))
    .with_context(|| format!("Failed to create base table {}", base_table))?;
    Ok(())
}

// Attribute columns carry no declared type, so values keep their storage
// class: an integer 0 reads back as 0, not "0".
fn create_translation_table(conn: &Connection, config: &TranslateableConfig) -> Result<()> {
    let table = &config.relation.table;
    let link_columns: Vec<String> = config
        .relation
        .link
        .iter()
        .map(|link| format!("\"{}\" NOT NULL", link.field))
        .collect();
    let attribute_columns: Vec<String> = config
        .translation_attributes
        .iter()
        .map(|attribute| format!("\"{}\"", attribute))
        .collect();
    let key_columns: Vec<String> = config
        .relation
        .link
        .iter()
        .map(|link| format!("\"{}\"", link.field))
        .chain(std::iter::once(format!("\"{}\"", config.language_field)))
        .collect();

    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {links},
            "{language}" TEXT NOT NULL,
            {attributes},
            UNIQUE({keys})
        );

        CREATE INDEX IF NOT EXISTS "idx_{table}_link" ON "{table}"({links_only});
        "#,
        table = table,
        links = link_columns.join(",\n            "),
        language = config.language_field,
        attributes = attribute_columns.join(",\n            "),
        keys = key_columns.join(", "),
        links_only = key_columns[..key_columns.len() - 1].join(", "),
    );

    conn.execute_batch(&sql)
        .with_context(|| format!("Failed to create translation table {}", table))?;
    Ok(())
}

fn add_missing_attribute_columns(conn: &Connection, config: &TranslateableConfig) -> Result<()> {
    let table = &config.relation.table;
    let existing = table_columns(conn, table)?;

    for attribute in &config.translation_attributes {
        if !existing.contains(attribute) {
            info!("Adding column {} to {}", attribute, table);
            conn.execute_batch(&format!("ALTER TABLE \"{}\" ADD COLUMN \"{}\";", table, attribute))?;
        }
    }
    Ok(())
}

/// Column names of a table, in declaration order
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info(\"{}\")", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}
