/*!
 * Core translation functionality.
 *
 * [`Translateable`] is what a base record instance holds to expose its
 * translatable attributes. Reads resolve through the fallback chain, writes
 * land in the cached record of the active language (or of each language in
 * a multi-language write), and the host calls the lifecycle methods from
 * its own load, save and delete paths.
 */

use std::collections::HashSet;

use log::debug;
use serde_json::Value;

use crate::app_config::TranslateableConfig;
use crate::errors::StoreError;
use crate::language_utils::normalize;
use crate::store::{BaseRecord, TranslationStore, TranslationTable};
use crate::translation::{TranslationCache, TranslationRecord};

/// Key marking the multi-language form of an attribute write
pub const MULTI_ASSIGNMENT_KEY: &str = "translations";

/// A value written to a translatable attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeWrite {
    /// Write to the active language
    Value(Value),
    /// Write one value per language, leaving the active language alone
    Translations(Vec<(String, Value)>),
}

impl AttributeWrite {
    pub fn translations<K: AsRef<str>, V: Into<Value>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Translations(
            entries
                .into_iter()
                .map(|(language, value)| (language.as_ref().to_string(), value.into()))
                .collect(),
        )
    }
}

/// `{"translations": {"en": .., "ru": ..}}` is the multi-language form;
/// anything else is a plain value.
impl From<Value> for AttributeWrite {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove(MULTI_ASSIGNMENT_KEY) {
                Some(Value::Object(entries)) => Self::Translations(entries.into_iter().collect()),
                Some(other) => {
                    map.insert(MULTI_ASSIGNMENT_KEY.to_string(), other);
                    Self::Value(Value::Object(map))
                }
                None => Self::Value(Value::Object(map)),
            },
            other => Self::Value(other),
        }
    }
}

impl From<&str> for AttributeWrite {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for AttributeWrite {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

/// Result of reading a property name through [`Translateable::get`]
#[derive(Debug, PartialEq)]
pub enum PropertyAccess<'a> {
    /// The name is a cached language: the record itself
    Translation(&'a TranslationRecord),
    /// The name is a translatable attribute: its resolved value
    Value(Value),
    /// Not ours; the host handles the name as an ordinary attribute
    NotHandled,
}

/// Translation state of one base record instance
pub struct Translateable<S: TranslationStore> {
    pub(crate) config: TranslateableConfig,
    pub(crate) table: TranslationTable,
    pub(crate) store: S,
    pub(crate) cache: TranslationCache,
    language: Option<String>,
}

impl<S: TranslationStore> Translateable<S> {
    /// Create the translation state for a fresh base record instance
    pub fn new(config: TranslateableConfig, store: S) -> Self {
        let table = TranslationTable::new(&config.relation.table, &config.language_field);
        let language = config.language.as_deref().map(normalize);
        Self {
            config,
            table,
            store,
            cache: TranslationCache::new(),
            language,
        }
    }

    pub fn config(&self) -> &TranslateableConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Active language, defaulting to the ambient application language
    pub fn language(&self) -> String {
        match &self.language {
            Some(language) => language.clone(),
            None => normalize(&self.config.ambient.app_language),
        }
    }

    /// Switch the active language, loading its translation
    pub fn set_language<R: BaseRecord + ?Sized>(&mut self, owner: &R, language: &str) -> Result<(), StoreError> {
        let language = normalize(language);
        self.load(owner, &language)?;
        self.language = Some(language);
        Ok(())
    }

    /// Whether `name` is one of the translatable attributes
    pub fn is_translation_attribute(&self, name: &str) -> bool {
        self.config.is_translation_attribute(name)
    }

    /// The cached record for a language (the active one when `None`)
    pub fn translation<R: BaseRecord + ?Sized>(
        &mut self,
        owner: &R,
        language: Option<&str>,
    ) -> Result<&mut TranslationRecord, StoreError> {
        let language = match language {
            Some(language) => normalize(language),
            None => self.language(),
        };
        self.load(owner, &language)
    }

    /// Load the records of several languages up front
    pub fn load_translations<R: BaseRecord + ?Sized>(&mut self, owner: &R, languages: &[&str]) -> Result<(), StoreError> {
        self.cache
            .preload(languages, &self.store, &self.table, &self.config.relation, owner)
    }

    /// Next language in the fallback chain of `language`
    pub fn fallback_language(&self, language: &str) -> String {
        self.config
            .fallback_language
            .resolve(language, &self.config.ambient.source_language)
    }

    /// Resolve an attribute by walking the fallback chain from `language`
    ///
    /// Returns the value together with the language it came from. The walk
    /// stops at the first non-null value or just before the chain would
    /// revisit a language; in the latter case the value of the last language
    /// visited is returned, null included.
    pub fn resolve_attribute<R: BaseRecord + ?Sized>(
        &mut self,
        owner: &R,
        attribute: &str,
        language: &str,
    ) -> Result<(Value, String), StoreError> {
        let mut visited = HashSet::new();
        let mut language = normalize(language);
        loop {
            let value = self.load(owner, &language)?.get(attribute).clone();
            let next_language = self.fallback_language(&language);
            visited.insert(language.clone());

            if visited.contains(&next_language) {
                return Ok((value, language));
            }
            if !value.is_null() {
                return Ok((value, language));
            }
            debug!("'{}' has no '{}' value, falling back to '{}'", language, attribute, next_language);
            language = next_language;
        }
    }

    /// Value of an attribute in the active language
    pub fn attribute<R: BaseRecord + ?Sized>(&mut self, owner: &R, attribute: &str) -> Result<Value, StoreError> {
        let language = self.language();
        self.resolve_attribute(owner, attribute, &language).map(|(value, _)| value)
    }

    /// Write a translatable attribute
    pub fn set_attribute<R, W>(&mut self, owner: &R, attribute: &str, write: W) -> Result<(), StoreError>
    where
        R: BaseRecord + ?Sized,
        W: Into<AttributeWrite>,
    {
        match write.into() {
            AttributeWrite::Value(value) => {
                let language = self.language();
                self.load(owner, &language)?.set(attribute, value);
            }
            AttributeWrite::Translations(entries) => {
                for (language, value) in entries {
                    self.load(owner, &language)?.set(attribute, value);
                }
            }
        }
        Ok(())
    }

    /// Read a property name on behalf of the host
    ///
    /// A cached language key takes precedence over an attribute name.
    pub fn get<R: BaseRecord + ?Sized>(&mut self, owner: &R, name: &str) -> Result<PropertyAccess<'_>, StoreError> {
        if self.cache.contains(name) {
            return Ok(self
                .cache
                .get(name)
                .map_or(PropertyAccess::NotHandled, PropertyAccess::Translation));
        }
        if !self.is_translation_attribute(name) {
            return Ok(PropertyAccess::NotHandled);
        }
        self.attribute(owner, name).map(PropertyAccess::Value)
    }

    /// Write a property name on behalf of the host
    ///
    /// Returns `false` when the name is not translatable and the host should
    /// store the value itself.
    pub fn set<R: BaseRecord + ?Sized>(&mut self, owner: &R, name: &str, value: Value) -> Result<bool, StoreError> {
        if !self.is_translation_attribute(name) {
            return Ok(false);
        }
        self.set_attribute(owner, name, value)?;
        Ok(true)
    }

    /// Whether the active language has no stored row of its own
    ///
    /// Always false with fallback disabled. This is row level: a stored row
    /// with a null attribute still reports `false` even though that attribute
    /// resolves through the fallback chain.
    pub fn is_fallback_translation<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> Result<bool, StoreError> {
        if self.config.fallback_language.is_disabled() {
            return Ok(false);
        }
        let language = self.language();
        Ok(self.load(owner, &language)?.is_new_record())
    }

    /// Host hook: the base record was loaded from storage
    pub fn after_find<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> Result<(), StoreError> {
        if let Some(batch) = owner.eager_translations() {
            self.cache.populate_from_eager_load(batch.iter().cloned());
        }
        let language = self.language();
        self.load(owner, &language)?;
        Ok(())
    }

    /// Host hook: the base record was inserted
    pub fn after_insert<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> bool {
        self.save_translations(owner)
    }

    /// Host hook: the base record was updated
    pub fn after_update<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> bool {
        self.save_translations(owner)
    }

    pub(crate) fn load<R: BaseRecord + ?Sized>(
        &mut self,
        owner: &R,
        language: &str,
    ) -> Result<&mut TranslationRecord, StoreError> {
        self.cache
            .get_or_load(language, &self.store, &self.table, &self.config.relation, owner)
    }
}
