/*!
 * Collaborator contract between the translation engine and its host.
 *
 * The host supplies two things: a base record that can report its identity
 * (current and as last persisted), and a storage backend that can find,
 * insert, update and delete translation rows. The SQLite adapter in
 * [`crate::database`] is one such backend.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;
use crate::translation::TranslationRecord;

/// Ordered `(translation field, value)` pairs linking a translation to its base record
pub type LinkValues = Vec<(String, Value)>;

/// One translation-field -> base-field link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkField {
    /// Column on the translation table
    pub field: String,
    /// Identity field on the base record it mirrors
    pub references: String,
}

impl LinkField {
    pub fn new(field: &str, references: &str) -> Self {
        Self {
            field: field.to_string(),
            references: references.to_string(),
        }
    }
}

/// Describes how translation rows hang off a base record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name on the base record
    #[serde(default = "default_relation_name")]
    pub name: String,

    /// Table holding the translation rows
    #[serde(default = "default_translation_table")]
    pub table: String,

    /// Link fields, in key order
    #[serde(default = "default_link")]
    pub link: Vec<LinkField>,
}

impl Default for Relation {
    fn default() -> Self {
        Self {
            name: default_relation_name(),
            table: default_translation_table(),
            link: default_link(),
        }
    }
}

fn default_relation_name() -> String {
    "translations".to_string()
}

fn default_translation_table() -> String {
    "post_lang".to_string()
}

fn default_link() -> Vec<LinkField> {
    vec![LinkField::new("post_id", "id")]
}

impl Relation {
    /// Link values used to look up stored translations
    ///
    /// A persisted base record is searched by its identity as last stored,
    /// so identity changes made before saving still find the existing rows.
    /// A new record uses its current values. Missing values become null.
    pub fn search_link<R: BaseRecord + ?Sized>(&self, owner: &R) -> LinkValues {
        self.link
            .iter()
            .map(|link| {
                let value = if owner.is_new_record() {
                    owner.attribute(&link.references)
                } else {
                    owner.old_attribute(&link.references)
                };
                (link.field.clone(), value.unwrap_or(Value::Null))
            })
            .collect()
    }

    /// Link values taken from the base record's current identity
    pub fn current_link<R: BaseRecord + ?Sized>(&self, owner: &R) -> Result<LinkValues, StoreError> {
        self.link
            .iter()
            .map(|link| match owner.attribute(&link.references) {
                Some(value) if !value.is_null() => Ok((link.field.clone(), value)),
                _ => Err(StoreError::MissingLinkValue(link.references.clone())),
            })
            .collect()
    }
}

/// Where a backend reads and writes translation rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationTable {
    /// Table name
    pub table: String,
    /// Column holding the language tag
    pub language_field: String,
}

impl TranslationTable {
    pub fn new(table: &str, language_field: &str) -> Self {
        Self {
            table: table.to_string(),
            language_field: language_field.to_string(),
        }
    }
}

/// The owning record that translations are attached to
pub trait BaseRecord {
    /// Current value of a base field
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Value of a base field as last loaded or saved; `None` if never persisted
    fn old_attribute(&self, name: &str) -> Option<Value>;

    /// Whether the record has not been persisted yet
    fn is_new_record(&self) -> bool;

    /// Translations fetched together with the record, if any
    fn eager_translations(&self) -> Option<&[TranslationRecord]> {
        None
    }
}

/// Storage backend for translation rows
pub trait TranslationStore {
    /// Find the row for one language of one base record
    fn find_translation(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError>;

    /// Every stored translation of one base record
    fn find_all(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
    ) -> Result<Vec<TranslationRecord>, StoreError>;

    /// Insert a new row, returning its generated id
    fn insert(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<i64, StoreError>;

    /// Write a stored row's link fields and changed attributes
    fn update(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError>;

    /// Remove a stored row
    fn delete(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError>;
}

impl<T: TranslationStore + ?Sized> TranslationStore for &T {
    fn find_translation(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError> {
        (**self).find_translation(table, link, language)
    }

    fn find_all(
        &self,
        table: &TranslationTable,
        link: &LinkValues,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        (**self).find_all(table, link)
    }

    fn insert(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<i64, StoreError> {
        (**self).insert(table, record)
    }

    fn update(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        (**self).update(table, record)
    }

    fn delete(&self, table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        (**self).delete(table, record)
    }
}
