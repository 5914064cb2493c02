/*!
 * Deletion policy against an in-memory store
 */

use polyglot::app_config::{DeleteHook, DeletionMode, TranslateableConfig};
use polyglot::store::{TranslationStore, TranslationTable};
use polyglot::translation::{DeletionOutcome, Translateable};
use serde_json::json;

use crate::common::{self, MemoryStore, TestRecord};

fn restricted_config() -> TranslateableConfig {
    let mut config = common::config(&["title"]);
    config.delete_hook = DeleteHook::BeforeDelete;
    config.restrict_deletion = DeletionMode::Last;
    config
}

#[test]
fn test_beforeDelete_withRestriction_shouldVetoUntilOneTranslationLeft() {
    common::init_logging();
    let store = MemoryStore::new();
    store.seed(1, "en", &[("title", json!("Example"))]);
    store.seed(1, "ru", &[("title", json!("пример"))]);
    let post = TestRecord::persisted(1);

    let mut translations = Translateable::new(restricted_config(), &store);
    let outcome = translations.before_delete(&post).unwrap();
    assert_eq!(outcome, DeletionOutcome::Vetoed { translations: 2 });
    assert!(!outcome.is_permitted());
    assert_eq!(store.rows().len(), 2);
    assert_eq!(store.deletes.get(), 0);

    // Remove one translation directly, then try again
    let ru = store.rows().into_iter().find(|r| r.language() == "ru").unwrap();
    let table = TranslationTable::new("post_lang", "language");
    store.delete(&table, &ru).unwrap();

    let mut translations = Translateable::new(restricted_config(), &store);
    let outcome = translations.before_delete(&post).unwrap();
    assert_eq!(outcome, DeletionOutcome::Permitted { deleted: 1 });
    assert!(store.rows().is_empty());
}

#[test]
fn test_beforeDelete_withUnrestrictedMode_shouldDeleteAll() {
    let store = MemoryStore::new();
    for language in ["en", "de", "ru"] {
        store.seed(1, language, &[("title", json!(language))]);
    }
    store.seed(2, "en", &[("title", json!("Other"))]);
    let mut config = common::config(&["title"]);
    config.delete_hook = DeleteHook::BeforeDelete;

    let mut translations = Translateable::new(config, &store);
    let outcome = translations.before_delete(&TestRecord::persisted(1)).unwrap();

    assert_eq!(outcome, DeletionOutcome::Permitted { deleted: 3 });
    assert_eq!(store.languages_of(2), vec!["en"]);
}

#[test]
fn test_afterDelete_withRestriction_shouldNotVeto() {
    let store = MemoryStore::new();
    store.seed(1, "en", &[("title", json!("Example"))]);
    store.seed(1, "de", &[("title", json!("Beispiel"))]);
    let mut config = restricted_config();
    config.delete_hook = DeleteHook::AfterDelete;

    let mut translations = Translateable::new(config, &store);
    let post = TestRecord::persisted(1);

    assert_eq!(translations.before_delete(&post).unwrap(), DeletionOutcome::Permitted { deleted: 0 });
    assert_eq!(translations.after_delete(&post).unwrap(), DeletionOutcome::Permitted { deleted: 2 });
    assert!(store.rows().is_empty());
}

#[test]
fn test_beforeDelete_withFailingStorage_shouldReturnError() {
    let store = MemoryStore::new();
    store.fail_lookups();
    let mut translations = Translateable::new(restricted_config(), &store);

    assert!(translations.before_delete(&TestRecord::persisted(1)).is_err());
}
