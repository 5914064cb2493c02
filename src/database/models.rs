/*!
 * Database entity models.
 *
 * [`StoredRecord`] is the base table row and the [`BaseRecord`] the SQLite
 * adapter hands to the translation engine. Attribute values cross the
 * database boundary through [`to_sql_value`] and [`from_sql_value`].
 */

use rusqlite::types::{Value as SqlValue, ValueRef};
use serde::Serialize;
use serde_json::Value;

use crate::store::BaseRecord;
use crate::translation::TranslationRecord;

/// A row of a base table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredRecord {
    /// Current identity; `None` until assigned or inserted
    pub id: Option<i64>,

    /// Identity as last loaded or saved
    #[serde(skip)]
    old_id: Option<i64>,

    /// Creation timestamp (RFC 3339)
    pub created_at: Option<String>,

    /// Last update timestamp (RFC 3339)
    pub updated_at: Option<String>,

    /// Translations fetched together with the row
    #[serde(skip)]
    eager: Option<Vec<TranslationRecord>>,
}

impl StoredRecord {
    /// Create a record that has not been inserted yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the record's identity; takes effect on the next save
    pub fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    /// Identity as last loaded or saved
    pub fn old_id(&self) -> Option<i64> {
        self.old_id
    }

    /// Attach a batch of translations loaded alongside the row
    pub fn with_eager_translations(mut self, translations: Vec<TranslationRecord>) -> Self {
        self.eager = Some(translations);
        self
    }

    pub(crate) fn from_row(id: i64, created_at: String, updated_at: String) -> Self {
        Self {
            id: Some(id),
            old_id: Some(id),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            eager: None,
        }
    }

    pub(crate) fn mark_persisted(&mut self, id: i64, timestamp: &str) {
        if self.created_at.is_none() {
            self.created_at = Some(timestamp.to_string());
        }
        self.updated_at = Some(timestamp.to_string());
        self.id = Some(id);
        self.old_id = Some(id);
    }
}

impl BaseRecord for StoredRecord {
    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.id.map(Value::from),
            "created_at" => self.created_at.clone().map(Value::from),
            "updated_at" => self.updated_at.clone().map(Value::from),
            _ => None,
        }
    }

    fn old_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => self.old_id.map(Value::from),
            _ if self.old_id.is_some() => self.attribute(name),
            _ => None,
        }
    }

    fn is_new_record(&self) -> bool {
        self.old_id.is_none()
    }

    fn eager_translations(&self) -> Option<&[TranslationRecord]> {
        self.eager.as_deref()
    }
}

/// Convert an attribute value for binding into a statement
///
/// Booleans and compound values have no SQLite storage class of their own;
/// they are stored as JSON in a blob so they read back with their type.
pub fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => number.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Blob(other.to_string().into_bytes()),
    }
}

/// Convert a column value read from a row
pub fn from_sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => serde_json::Number::from_f64(real).map_or(Value::Null, Value::Number),
        ValueRef::Text(text) => Value::from(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => serde_json::from_slice(bytes)
            .unwrap_or_else(|_| Value::from(String::from_utf8_lossy(bytes).into_owned())),
    }
}
