/*!
 * Deletion policy for a base record's translations.
 */

use log::{debug, warn};

use crate::app_config::{DeleteHook, DeletionMode};
use crate::errors::StoreError;
use crate::store::{BaseRecord, TranslationStore};
use crate::translation::{Translateable, TranslationRecord};

/// What a deletion hook decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Deletion goes ahead; `deleted` translation rows were removed
    Permitted { deleted: usize },
    /// Deletion is not permitted while this many translations exist
    Vetoed { translations: usize },
}

impl DeletionOutcome {
    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted { .. })
    }
}

impl<S: TranslationStore> Translateable<S> {
    /// Host hook: the base record is about to be deleted
    ///
    /// With `DeletionMode::Last` the deletion is vetoed while more than one
    /// translation is stored, before any row is touched. Otherwise all
    /// translations are removed. Does nothing unless the configured hook is
    /// `DeleteHook::BeforeDelete`.
    pub fn before_delete<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> Result<DeletionOutcome, StoreError> {
        if self.config.delete_hook != DeleteHook::BeforeDelete {
            return Ok(DeletionOutcome::Permitted { deleted: 0 });
        }

        let link = self.config.relation.search_link(owner);
        let stored = self.store.find_all(&self.table, &link)?;
        if self.config.restrict_deletion == DeletionMode::Last && stored.len() > 1 {
            warn!(
                "Deletion refused: {} translations still attached, remove all but one first",
                stored.len()
            );
            return Ok(DeletionOutcome::Vetoed {
                translations: stored.len(),
            });
        }

        self.delete_translations(stored)
    }

    /// Host hook: the base record has been deleted
    ///
    /// Removes all translations; a deletion restriction cannot apply any more
    /// at this point. Does nothing unless the configured hook is
    /// `DeleteHook::AfterDelete`.
    pub fn after_delete<R: BaseRecord + ?Sized>(&mut self, owner: &R) -> Result<DeletionOutcome, StoreError> {
        if self.config.delete_hook != DeleteHook::AfterDelete {
            return Ok(DeletionOutcome::Permitted { deleted: 0 });
        }

        let link = self.config.relation.search_link(owner);
        let stored = self.store.find_all(&self.table, &link)?;
        self.delete_translations(stored)
    }

    fn delete_translations(&self, stored: Vec<TranslationRecord>) -> Result<DeletionOutcome, StoreError> {
        let deleted = stored.len();
        for translation in &stored {
            self.store.delete(&self.table, translation)?;
        }
        debug!("Deleted {} translations", deleted);
        Ok(DeletionOutcome::Permitted { deleted })
    }
}
