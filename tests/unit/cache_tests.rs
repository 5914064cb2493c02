/*!
 * Tests for the per-record translation cache
 */

use polyglot::store::{Relation, TranslationTable};
use polyglot::translation::{TranslationCache, TranslationRecord};
use serde_json::json;

use crate::common::{MemoryStore, TestRecord};

fn table() -> TranslationTable {
    TranslationTable::new("post_lang", "language")
}

#[test]
fn test_getOrLoad_withStoredRow_shouldReturnPersistedRecord() {
    let store = MemoryStore::new();
    store.seed(1, "en", &[("title", json!("Example"))]);
    let mut cache = TranslationCache::new();

    let record = cache
        .get_or_load("EN", &store, &table(), &Relation::default(), &TestRecord::persisted(1))
        .unwrap();

    assert!(!record.is_new_record());
    assert_eq!(record.get("title"), &json!("Example"));
}

#[test]
fn test_getOrLoad_withoutRow_shouldCreatePrefilledNewRecord() {
    let store = MemoryStore::new();
    let mut cache = TranslationCache::new();

    let record = cache
        .get_or_load("de-AT", &store, &table(), &Relation::default(), &TestRecord::persisted(3))
        .unwrap();

    assert!(record.is_new_record());
    assert_eq!(record.language(), "de-at");
    assert_eq!(record.link(), &vec![("post_id".to_string(), json!(3))]);
}

#[test]
fn test_getOrLoad_calledTwice_shouldQueryStorageOnce() {
    let store = MemoryStore::new();
    let owner = TestRecord::persisted(1);
    let mut cache = TranslationCache::new();

    cache.get_or_load("de", &store, &table(), &Relation::default(), &owner).unwrap();
    cache.get_or_load("DE", &store, &table(), &Relation::default(), &owner).unwrap();

    assert_eq!(store.finds.get(), 1);
    assert_eq!(cache.len(), 1);
    let (hits, misses, _) = cache.stats();
    assert_eq!((hits, misses), (1, 1));
}

#[test]
fn test_getOrLoad_withUnsavedOwner_shouldNotQueryStorage() {
    let store = MemoryStore::new();
    let mut cache = TranslationCache::new();

    let record = cache
        .get_or_load("en", &store, &table(), &Relation::default(), &TestRecord::new())
        .unwrap();

    assert!(record.is_new_record());
    assert_eq!(store.finds.get(), 0);
}

#[test]
fn test_getOrLoad_withFailingStorage_shouldPropagateAndNotCache() {
    let store = MemoryStore::new();
    store.fail_lookups();
    let mut cache = TranslationCache::new();

    let result = cache.get_or_load("en", &store, &table(), &Relation::default(), &TestRecord::persisted(1));

    assert!(result.is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_preload_shouldKeepFirstAccessOrder() {
    let store = MemoryStore::new();
    let owner = TestRecord::persisted(1);
    let mut cache = TranslationCache::new();

    cache.get_or_load("ru", &store, &table(), &Relation::default(), &owner).unwrap();
    cache
        .preload(&["en", "RU", "de"], &store, &table(), &Relation::default(), &owner)
        .unwrap();

    assert_eq!(cache.languages(), vec!["ru", "en", "de"]);
}

#[test]
fn test_populateFromEagerLoad_shouldSeedWithoutStorage() {
    let store = MemoryStore::new();
    let link = vec![("post_id".to_string(), json!(1))];
    let mut values = polyglot::translation::AttributeValues::new();
    values.insert("title".to_string(), json!("Beispiel"));
    let mut cache = TranslationCache::new();

    cache.populate_from_eager_load(vec![
        TranslationRecord::from_storage(7, link.clone(), "de", values),
        TranslationRecord::from_storage(8, link, "en", Default::default()),
    ]);
    let record = cache
        .get_or_load("de", &store, &table(), &Relation::default(), &TestRecord::persisted(1))
        .unwrap();

    assert_eq!(record.get("title"), &json!("Beispiel"));
    assert_eq!(store.finds.get(), 0);
    assert_eq!(cache.languages(), vec!["de", "en"]);
}
