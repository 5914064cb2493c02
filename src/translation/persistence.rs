/*!
 * Save policy for cached translations.
 *
 * Runs after the base record is inserted or updated. Every cached record
 * with changes is written independently; a failed write is logged and
 * reflected in the overall result but does not stop the remaining ones.
 */

use log::{debug, warn};
use serde_json::Value;

use crate::errors::StoreError;
use crate::language_utils::normalize;
use crate::store::{BaseRecord, TranslationStore};
use crate::translation::Translateable;

impl<S: TranslationStore> Translateable<S> {
    /// Persist every changed cached translation, in first-access order
    ///
    /// Returns `true` only if every attempted write succeeded. Records added
    /// to the cache while this runs (by duplicate checks) are not visited;
    /// they are freshly loaded and carry no changes.
    pub fn save_translations<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> bool {
        let mut all_saved = true;
        let count = self.cache.len();

        for position in 0..count {
            let Some((language, record)) = self.cache.entry_at(position) else {
                continue;
            };
            let language = language.to_string();
            let is_new = record.is_new_record();

            if !record.is_dirty() {
                debug!("Translation '{}' unchanged, nothing to save", language);
                continue;
            }

            if self.config.skip_saving_duplicate_translation && is_new {
                match self.is_duplicate_of_fallback(owner, &language) {
                    Ok(true) => {
                        debug!("Translation '{}' duplicates its fallback, not saved", language);
                        continue;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Could not compare translation '{}' with its fallback: {}", language, e);
                        all_saved = false;
                        continue;
                    }
                }
            }

            if let Err(e) = self.persist_at(owner, position) {
                warn!("Failed to save translation '{}': {}", language, e);
                all_saved = false;
            }
        }

        all_saved
    }

    /// Whether a cached translation only repeats what its fallback chain yields
    ///
    /// Every attribute holding a value must resolve, starting from the next
    /// language in the chain, to an equal value that comes from a different
    /// language. A record with no values at all counts as a duplicate.
    pub fn is_duplicate_of_fallback<R: BaseRecord + ?Sized>(
        &mut self,
        owner: &R,
        language: &str,
    ) -> Result<bool, StoreError> {
        let language = normalize(language);
        let attributes = self.config.translation_attributes.clone();
        let record = self.load(owner, &language)?;
        let assigned: Vec<(String, Value)> = attributes
            .into_iter()
            .filter(|attribute| record.has_value(attribute))
            .map(|attribute| {
                let value = record.get(&attribute).clone();
                (attribute, value)
            })
            .collect();

        let fallback_language = self.fallback_language(&language);
        for (attribute, value) in assigned {
            let (fallback_value, source_language) =
                self.resolve_attribute(owner, &attribute, &fallback_language)?;
            if source_language == language || fallback_value != value {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Link the record at `position` to the owner's current identity and write it
    fn persist_at<R: BaseRecord + ?Sized>(&mut self, owner: &R, position: usize) -> Result<(), StoreError> {
        let link = self.config.relation.current_link(owner)?;
        let Some(record) = self.cache.record_at_mut(position) else {
            return Ok(());
        };
        record.set_link(link);

        if record.is_new_record() {
            let id = self.store.insert(&self.table, record)?;
            debug!("Inserted translation '{}' with id {}", record.language(), id);
            record.mark_persisted(id);
        } else {
            let id = record.id().ok_or_else(|| StoreError::NotPersisted {
                language: record.language().to_string(),
            })?;
            self.store.update(&self.table, record)?;
            debug!("Updated translation '{}'", record.language());
            record.mark_persisted(id);
        }
        Ok(())
    }
}
