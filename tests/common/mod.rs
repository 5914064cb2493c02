/*!
 * Common test utilities for the polyglot test suite
 */

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use anyhow::Result;
use polyglot::app_config::TranslateableConfig;
use polyglot::database::{DatabaseConnection, Repository};
use polyglot::errors::StoreError;
use polyglot::store::{BaseRecord, LinkValues, TranslationStore, TranslationTable};
use polyglot::translation::TranslationRecord;
use serde_json::Value;
use tempfile::TempDir;

/// Base record with a single integer identity, no storage of its own
#[derive(Debug, Clone, Default)]
pub struct TestRecord {
    pub id: Option<i64>,
    old_id: Option<i64>,
    eager: Option<Vec<TranslationRecord>>,
}

impl TestRecord {
    /// A record that was never saved
    pub fn new() -> Self {
        Self::default()
    }

    /// A record loaded from storage with the given id
    pub fn persisted(id: i64) -> Self {
        Self {
            id: Some(id),
            old_id: Some(id),
            eager: None,
        }
    }

    /// Pretend the host saved the record under its current id
    pub fn save(&mut self, id: i64) {
        self.id = Some(id);
        self.old_id = Some(id);
    }

    pub fn with_eager(mut self, batch: Vec<TranslationRecord>) -> Self {
        self.eager = Some(batch);
        self
    }
}

impl BaseRecord for TestRecord {
    fn attribute(&self, name: &str) -> Option<Value> {
        (name == "id").then(|| self.id.map(Value::from)).flatten()
    }

    fn old_attribute(&self, name: &str) -> Option<Value> {
        (name == "id").then(|| self.old_id.map(Value::from)).flatten()
    }

    fn is_new_record(&self) -> bool {
        self.old_id.is_none()
    }

    fn eager_translations(&self) -> Option<&[TranslationRecord]> {
        self.eager.as_deref()
    }
}

/// In-memory translation store with operation counters and scripted failures
#[derive(Default)]
pub struct MemoryStore {
    rows: RefCell<Vec<TranslationRecord>>,
    next_id: Cell<i64>,
    failing_languages: RefCell<HashSet<String>>,
    fail_lookups: Cell<bool>,
    pub finds: Cell<usize>,
    pub inserts: Cell<usize>,
    pub updates: Cell<usize>,
    pub deletes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert or update of `language` fail
    pub fn fail_writes_for(&self, language: &str) {
        self.failing_languages.borrow_mut().insert(language.to_string());
    }

    /// Make every lookup fail
    pub fn fail_lookups(&self) {
        self.fail_lookups.set(true);
    }

    /// Store a row directly, bypassing the engine
    pub fn seed(&self, id: i64, language: &str, attributes: &[(&str, Value)]) {
        let link = vec![("post_id".to_string(), Value::from(id))];
        let mut record = TranslationRecord::new_record(link, language);
        for (attribute, value) in attributes {
            record.set(attribute, value.clone());
        }
        self.store_row(&record);
    }

    /// Stored rows, in insertion order
    pub fn rows(&self) -> Vec<TranslationRecord> {
        self.rows.borrow().clone()
    }

    /// Stored languages of one base record, in insertion order
    pub fn languages_of(&self, id: i64) -> Vec<String> {
        let link = vec![("post_id".to_string(), Value::from(id))];
        self.rows
            .borrow()
            .iter()
            .filter(|row| row.link() == &link)
            .map(|row| row.language().to_string())
            .collect()
    }

    fn store_row(&self, record: &TranslationRecord) -> i64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.rows.borrow_mut().push(TranslationRecord::from_storage(
            id,
            record.link().clone(),
            record.language(),
            record.values().clone(),
        ));
        id
    }

    fn check_write(&self, record: &TranslationRecord) -> Result<(), StoreError> {
        if self.failing_languages.borrow().contains(record.language()) {
            return Err(StoreError::Rejected(format!("{} is read-only", record.language())));
        }
        Ok(())
    }

    fn check_lookup(&self) -> Result<(), StoreError> {
        self.finds.set(self.finds.get() + 1);
        if self.fail_lookups.get() {
            return Err(StoreError::QueryFailed("storage offline".to_string()));
        }
        Ok(())
    }
}

impl TranslationStore for MemoryStore {
    fn find_translation(
        &self,
        _table: &TranslationTable,
        link: &LinkValues,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError> {
        self.check_lookup()?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .find(|row| row.link() == link && row.language() == language)
            .cloned())
    }

    fn find_all(&self, _table: &TranslationTable, link: &LinkValues) -> Result<Vec<TranslationRecord>, StoreError> {
        self.check_lookup()?;
        Ok(self
            .rows
            .borrow()
            .iter()
            .filter(|row| row.link() == link)
            .cloned()
            .collect())
    }

    fn insert(&self, _table: &TranslationTable, record: &TranslationRecord) -> Result<i64, StoreError> {
        self.check_write(record)?;
        let duplicate = self
            .rows
            .borrow()
            .iter()
            .any(|row| row.link() == record.link() && row.language() == record.language());
        if duplicate {
            return Err(StoreError::Rejected("duplicate language".to_string()));
        }
        self.inserts.set(self.inserts.get() + 1);
        Ok(self.store_row(record))
    }

    fn update(&self, _table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        self.check_write(record)?;
        let id = record.id().ok_or_else(|| StoreError::NotPersisted {
            language: record.language().to_string(),
        })?;
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|row| row.id() == Some(id))
            .ok_or_else(|| StoreError::QueryFailed(format!("no row {}", id)))?;
        *row = TranslationRecord::from_storage(id, record.link().clone(), record.language(), record.values().clone());
        self.updates.set(self.updates.get() + 1);
        Ok(())
    }

    fn delete(&self, _table: &TranslationTable, record: &TranslationRecord) -> Result<(), StoreError> {
        self.rows.borrow_mut().retain(|row| row.id() != record.id());
        self.deletes.set(self.deletes.get() + 1);
        Ok(())
    }
}

/// Route library logs to the test harness; `RUST_LOG=debug` shows chain steps
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Default settings with the given translatable attributes
pub fn config(attributes: &[&str]) -> TranslateableConfig {
    TranslateableConfig::with_attributes(attributes)
}

/// In-memory SQLite repository with tables for `config`
pub fn sqlite_repository(config: &TranslateableConfig) -> Result<Repository> {
    let repo = Repository::new_in_memory()?;
    repo.initialize_schema("post", config)?;
    Ok(repo)
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// On-disk SQLite repository inside a fresh temporary directory
pub fn file_repository(config: &TranslateableConfig) -> Result<(TempDir, Repository)> {
    let dir = TempDir::new()?;
    let connection = DatabaseConnection::new(dir.path().join("data").join("polyglot.db"))?;
    let repo = Repository::new(connection);
    repo.initialize_schema("post", config)?;
    Ok((dir, repo))
}
