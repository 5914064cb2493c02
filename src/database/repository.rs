/*!
 * Repository layer for database operations.
 *
 * [`Repository`] is the SQLite implementation of [`TranslationStore`], plus
 * the base table operations a host needs around it. Table and column names
 * come from configuration, so SQL is assembled at run time from checked
 * identifiers and every value is bound as a parameter.
 */

use std::collections::HashMap;

use anyhow::{Context, Result};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use serde_json::Value;

use super::connection::{DatabaseConnection, DatabaseStats};
use super::models::{StoredRecord, from_sql_value, to_sql_value};
use super::schema;
use crate::app_config::{TranslateableConfig, check_identifier};
use crate::errors::StoreError;
use crate::language_utils::normalize;
use crate::store::{BaseRecord, LinkValues, TranslationStore, TranslationTable};
use crate::translation::{AttributeValues, TranslationRecord};

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

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Create the base and translation tables if they do not exist yet
    pub fn initialize_schema(&self, base_table: &str, config: &TranslateableConfig) -> Result<()> {
        self.db
            .execute(|conn| schema::initialize_schema(conn, base_table, config))
    }

    /// Row counts of the base and translation tables
    pub fn stats(&self, base_table: &str, config: &TranslateableConfig) -> Result<DatabaseStats> {
        self.db.stats(base_table, &config.relation.table)
    }

    // =========================================================================
    // Base Record Operations
    // =========================================================================

    /// Insert a base record, assigning its id unless one was set
    pub fn insert_base(&self, table: &str, record: &mut StoredRecord) -> Result<i64> {
        let table = quoted(table)?;
        let now = chrono::Utc::now().to_rfc3339();
        let created_at = record.created_at.clone().unwrap_or_else(|| now.clone());
        let requested_id = record.id;

        let id = self.db.execute(|conn| -> Result<i64> {
            conn.execute(
                &format!("INSERT INTO {} (id, created_at, updated_at) VALUES (?1, ?2, ?3)", table),
                params![requested_id, created_at, now],
            )
            .with_context(|| format!("Failed to insert into {}", table))?;
            Ok(conn.last_insert_rowid())
        })?;

        record.created_at = Some(created_at);
        record.mark_persisted(id, &now);
        debug!("Inserted base record {} into {}", id, table);
        Ok(id)
    }

    /// Write a base record, including a changed id
    pub fn update_base(&self, table: &str, record: &mut StoredRecord) -> Result<()> {
        let old_id = record
            .old_id()
            .ok_or_else(|| anyhow::anyhow!("Cannot update a record that was never inserted"))?;
        let id = record.id.unwrap_or(old_id);
        let table = quoted(table)?;
        let now = chrono::Utc::now().to_rfc3339();

        let updated = self.db.execute(|conn| {
            conn.execute(
                &format!("UPDATE {} SET id = ?1, updated_at = ?2 WHERE id = ?3", table),
                params![id, now, old_id],
            )
        })?;
        if updated == 0 {
            anyhow::bail!("Record {} not found in {}", old_id, table);
        }

        record.mark_persisted(id, &now);
        debug!("Updated base record {} in {}", id, table);
        Ok(())
    }

    /// Delete a base record; returns whether a row was removed
    pub fn delete_base(&self, table: &str, record: &StoredRecord) -> Result<bool> {
        let Some(id) = record.old_id() else {
            return Ok(false);
        };
        let table = quoted(table)?;

        let deleted = self.db.execute(|conn| {
            conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])
        })?;
        Ok(deleted > 0)
    }

    /// Find a base record by id
    pub fn find_base(&self, table: &str, id: i64) -> Result<Option<StoredRecord>> {
        let table = quoted(table)?;

        let record = self.db.execute(|conn| {
            conn.query_row(
                &format!("SELECT id, created_at, updated_at FROM {} WHERE id = ?1", table),
                [id],
                |row| Ok(StoredRecord::from_row(row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
        })?;
        Ok(record)
    }

    /// Find a base record together with all of its stored translations
    pub fn find_base_with_translations(
        &self,
        table: &str,
        config: &TranslateableConfig,
        id: i64,
    ) -> Result<Option<StoredRecord>> {
        let Some(record) = self.find_base(table, id)? else {
            return Ok(None);
        };
        let translations = self.translations_of(config, &record)?;
        Ok(Some(record.with_eager_translations(translations)))
    }

    /// Every stored translation of a base record
    pub fn translations_of<R: BaseRecord + ?Sized>(
        &self,
        config: &TranslateableConfig,
        owner: &R,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        let table = TranslationTable::new(&config.relation.table, &config.language_field);
        self.find_all(&table, &config.relation.search_link(owner))
    }

    fn select_translations(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
        language: Option<&str>,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        for (field, value) in link {
            conditions.push(format!("{} = ?", identifier(field)?));
            values.push(to_sql_value(value));
        }
        if let Some(language) = language {
            // Rows written by other clients may carry mixed-case tags
            conditions.push(format!("lower({}) = ?", identifier(&table.language_field)?));
            values.push(SqlValue::Text(normalize(language)));
        }

        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY id",
            identifier(&table.table)?,
            conditions.join(" AND ")
        );

        self.db.execute(|conn| -> Result<Vec<TranslationRecord>, StoreError> {
            let mut stmt = conn.prepare(&sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query(params_from_iter(values))?;

            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_translation(row, &columns, table, link)?);
            }
            Ok(records)
        })
    }
}

impl TranslationStore for Repository {
    fn find_translation(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError> {
        Ok(self
            .select_translations(table, link, Some(language))?
            .into_iter()
            .next())
    }

    fn find_all(&self, table: &TranslationTable, link: &LinkValues) -> Result<Vec<TranslationRecord>, StoreError> {
        self.select_translations(table, link, None)
    }

    fn insert(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<i64, StoreError> {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (field, value) in record.link() {
            columns.push(identifier(field)?);
            values.push(to_sql_value(value));
        }
        columns.push(identifier(&table.language_field)?);
        values.push(SqlValue::Text(record.language().to_string()));
        for (attribute, value) in record.values() {
            columns.push(identifier(attribute)?);
            values.push(to_sql_value(value));
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            identifier(&table.table)?,
            columns.join(", "),
            placeholders
        );

        self.db.execute(|conn| -> Result<i64, StoreError> {
            conn.execute(&sql, params_from_iter(values))?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        let id = persisted_id(record)?;
        let mut assignments = Vec::new();
        let mut values = Vec::new();
        for (field, value) in record.link() {
            assignments.push(format!("{} = ?", identifier(field)?));
            values.push(to_sql_value(value));
        }
        assignments.push(format!("{} = ?", identifier(&table.language_field)?));
        values.push(SqlValue::Text(record.language().to_string()));
        for attribute in record.dirty_attributes() {
            assignments.push(format!("{} = ?", identifier(&attribute)?));
            values.push(to_sql_value(record.get(&attribute)));
        }
        values.push(SqlValue::Integer(id));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            identifier(&table.table)?,
            assignments.join(", ")
        );

        self.db.execute(|conn| -> Result<(), StoreError> {
            conn.execute(&sql, params_from_iter(values))?;
            Ok(())
        })
    }

    fn delete(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        let id = persisted_id(record)?;
        let sql = format!("DELETE FROM {} WHERE id = ?1", identifier(&table.table)?);

        self.db.execute(|conn| -> Result<(), StoreError> {
            conn.execute(&sql, [id])?;
            Ok(())
        })
    }
}

/// Quote a configured name for use in SQL
fn identifier(name: &str) -> Result<String, StoreError> {
    check_identifier(name).map_err(|e| StoreError::QueryFailed(e.to_string()))?;
    Ok(format!("\"{}\"", name))
}

fn quoted(name: &str) -> Result<String> {
    Ok(identifier(name)?)
}

fn persisted_id(record: &TranslationRecord) -> Result<i64, StoreError> {
    record.id().ok_or_else(|| StoreError::NotPersisted {
        language: record.language().to_string(),
    })
}

// Columns that are neither the key, the language nor a link field are
// attribute values.
fn row_to_translation(
    row: &Row<'_>,
    columns: &[String],
    table: &TranslationTable,
    link: &LinkValues,
) -> Result<TranslationRecord, StoreError> {
    let mut id = None;
    let mut language = String::new();
    let mut link_values: HashMap<&str, Value> = HashMap::new();
    let mut values = AttributeValues::new();

    for (index, column) in columns.iter().enumerate() {
        let value = from_sql_value(row.get_ref(index)?);
        if column == "id" {
            id = value.as_i64();
        } else if *column == table.language_field {
            language = value.as_str().unwrap_or_default().to_string();
        } else if link.iter().any(|(field, _)| field == column) {
            link_values.insert(column.as_str(), value);
        } else {
            values.insert(column.clone(), value);
        }
    }

    let id = id.ok_or_else(|| StoreError::QueryFailed(format!("Row of {} has no id", table.table)))?;
    let link = link
        .iter()
        .map(|(field, _)| {
            let value = link_values.remove(field.as_str()).unwrap_or(Value::Null);
            (field.clone(), value)
        })
        .collect();

    Ok(TranslationRecord::from_storage(id, link, &language, values))
}
