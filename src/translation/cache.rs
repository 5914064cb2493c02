/*!
 * Per-record translation cache.
 *
 * Each base record instance owns one cache holding at most one translation
 * record per normalized language. Entries are created on first access by
 * loading the stored row, or an unsaved record when none exists, and are
 * never evicted while the owning instance is alive.
 */

use std::collections::HashMap;

use log::debug;

use crate::errors::StoreError;
use crate::language_utils::normalize;
use crate::store::{BaseRecord, Relation, TranslationStore, TranslationTable};
use crate::translation::TranslationRecord;

/// Lazily populated language -> translation record map, in first-access order
#[derive(Debug, Clone, Default)]
pub struct TranslationCache {
    /// Entries keyed by normalized language
    entries: Vec<(String, TranslationRecord)>,

    /// Position of each language in `entries`
    index: HashMap<String, usize>,

    /// Lookups answered from the cache
    hits: usize,

    /// Lookups that went to storage
    misses: usize,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `language`, loading or creating it on first access
    pub fn get_or_load<S, R>(
        &mut self,
        language: &str,
        store: &S,
        table: &TranslationTable,
        relation: &Relation,
        owner: &R,
    ) -> Result<&mut TranslationRecord, StoreError>
    where
        S: TranslationStore + ?Sized,
        R: BaseRecord + ?Sized,
    {
        let language = normalize(language);
        let position = match self.index.get(&language) {
            Some(&position) => {
                self.hits += 1;
                position
            }
            None => {
                self.misses += 1;
                let record = load_translation(&language, store, table, relation, owner)?;
                self.push(language, record)
            }
        };

        Ok(&mut self.entries[position].1)
    }

    /// Make sure every language in `languages` has an entry
    pub fn preload<S, R>(
        &mut self,
        languages: &[&str],
        store: &S,
        table: &TranslationTable,
        relation: &Relation,
        owner: &R,
    ) -> Result<(), StoreError>
    where
        S: TranslationStore + ?Sized,
        R: BaseRecord + ?Sized,
    {
        for language in languages {
            self.get_or_load(language, store, table, relation, owner)?;
        }
        Ok(())
    }

    /// Seed the cache from a batch fetched together with the base record
    ///
    /// Records are keyed by their own language; an existing entry under the
    /// same key is replaced in place.
    pub fn populate_from_eager_load<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = TranslationRecord>,
    {
        for record in records {
            let language = normalize(record.language());
            match self.index.get(&language) {
                Some(&position) => self.entries[position].1 = record,
                None => {
                    self.push(language, record);
                }
            }
        }
        debug!("Translation cache seeded, {} languages cached", self.entries.len());
    }

    /// Cached entry for a language, without touching storage
    pub fn get(&self, language: &str) -> Option<&TranslationRecord> {
        self.index
            .get(&normalize(language))
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, language: &str) -> bool {
        self.index.contains_key(&normalize(language))
    }

    /// Entry at a position in first-access order
    pub fn entry_at(&self, position: usize) -> Option<(&str, &TranslationRecord)> {
        self.entries
            .get(position)
            .map(|(language, record)| (language.as_str(), record))
    }

    pub(crate) fn record_at_mut(&mut self, position: usize) -> Option<&mut TranslationRecord> {
        self.entries.get_mut(position).map(|(_, record)| record)
    }

    /// Cached languages in first-access order
    pub fn languages(&self) -> Vec<&str> {
        self.entries.iter().map(|(language, _)| language.as_str()).collect()
    }

    /// Iterate entries in first-access order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TranslationRecord)> {
        self.entries
            .iter()
            .map(|(language, record)| (language.as_str(), record))
    }

    /// Hits, misses and hit rate
    pub fn stats(&self) -> (usize, usize, f64) {
        let total = self.hits + self.misses;
        let hit_rate = if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        };
        (self.hits, self.misses, hit_rate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, language: String, record: TranslationRecord) -> usize {
        let position = self.entries.len();
        self.index.insert(language.clone(), position);
        self.entries.push((language, record));
        position
    }
}

/// Fetch the stored row for `language` or build an unsaved one
fn load_translation<S, R>(
    language: &str,
    store: &S,
    table: &TranslationTable,
    relation: &Relation,
    owner: &R,
) -> Result<TranslationRecord, StoreError>
where
    S: TranslationStore + ?Sized,
    R: BaseRecord + ?Sized,
{
    let link = relation.search_link(owner);

    // No stored row can reference an identity that does not exist yet
    if link.iter().any(|(_, value)| value.is_null()) {
        debug!("Translation '{}' created for unsaved base record", language);
        return Ok(TranslationRecord::new_record(link, language));
    }

    match store.find_translation(table, &link, language)? {
        Some(record) => {
            debug!("Translation '{}' loaded from storage", language);
            Ok(record)
        }
        None => {
            debug!("No stored translation '{}', created new record", language);
            Ok(TranslationRecord::new_record(link, language))
        }
    }
}
