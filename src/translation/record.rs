/*!
 * A single language's values for one base record.
 */

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

use crate::language_utils::normalize;
use crate::store::LinkValues;

static NULL: Value = Value::Null;

/// Translatable attribute values keyed by attribute name; absent means null
pub type AttributeValues = BTreeMap<String, Value>;

/// One row of translated values
///
/// A record is either *new* (no stored row matched when it was created) or
/// *persisted*. Change tracking compares against the values as last loaded
/// or saved; for a new record every explicit assignment counts, whatever the
/// value, so an empty string or a zero is still a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationRecord {
    id: Option<i64>,
    link: LinkValues,
    language: String,
    values: AttributeValues,
    #[serde(skip)]
    stored: Option<AttributeValues>,
    #[serde(skip)]
    assigned: BTreeSet<String>,
}

impl TranslationRecord {
    /// Create an unsaved record prefilled with its link fields and language
    pub fn new_record(link: LinkValues, language: &str) -> Self {
        Self {
            id: None,
            link,
            language: normalize(language),
            values: AttributeValues::new(),
            stored: None,
            assigned: BTreeSet::new(),
        }
    }

    /// Build a record from a stored row
    pub fn from_storage(id: i64, link: LinkValues, language: &str, values: AttributeValues) -> Self {
        Self {
            id: Some(id),
            link,
            language: normalize(language),
            stored: Some(values.clone()),
            values,
            assigned: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn link(&self) -> &LinkValues {
        &self.link
    }

    pub fn values(&self) -> &AttributeValues {
        &self.values
    }

    /// Whether no stored row backs this record yet
    pub fn is_new_record(&self) -> bool {
        self.stored.is_none()
    }

    /// Value of an attribute, null when never set
    pub fn get(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&NULL)
    }

    /// Whether the attribute currently holds a non-null value
    pub fn has_value(&self, attribute: &str) -> bool {
        !self.get(attribute).is_null()
    }

    /// Assign an attribute value
    pub fn set(&mut self, attribute: &str, value: Value) {
        self.assigned.insert(attribute.to_string());
        self.values.insert(attribute.to_string(), value);
    }

    /// Attributes changed since the record was loaded or created
    pub fn dirty_attributes(&self) -> Vec<String> {
        match &self.stored {
            None => self.assigned.iter().cloned().collect(),
            Some(stored) => self
                .values
                .iter()
                .filter(|(name, value)| stored.get(*name).unwrap_or(&NULL) != *value)
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_attributes().is_empty()
    }

    /// Point the record at a base record identity
    pub fn set_link(&mut self, link: LinkValues) {
        self.link = link;
    }

    /// Record a successful write: the current values become the stored state
    pub fn mark_persisted(&mut self, id: i64) {
        self.id = Some(id);
        self.stored = Some(self.values.clone());
        self.assigned.clear();
    }
}
