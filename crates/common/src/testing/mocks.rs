//! Mock implementations of common traits
//!
//! Provides mock objects for testing purposes.

// Allow missing error docs for test mocks - errors are clearly indicated by
// their return types
#![allow(clippy::missing_errors_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::storage::{KeyValueStore, StorageError, StorageResult};

type StorageData = Arc<Mutex<HashMap<String, String>>>;

/// Mock key-value storage for testing
///
/// Behaves like [`crate::MemoryStore`] but records every write and can be told
/// to fail writes, which is how persistence failures are simulated.
///
/// # Example
///
/// ```
/// use flowlab_common::testing::mocks::MockStorage;
/// use flowlab_common::KeyValueStore;
///
/// let storage = MockStorage::new();
/// storage.set("key1", "value1").unwrap();
///
/// let value = storage.get("key1").unwrap();
/// assert_eq!(value, Some("value1".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockStorage {
    data: StorageData,
    writes: Arc<Mutex<Vec<String>>>,
    fail_writes: Arc<AtomicBool>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
}

impl MockStorage {
    /// Create a new mock storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove`/`clear` fail (or succeed again)
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` of one key fail, leaving other keys writable
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().insert(key.to_string());
    }

    /// Check if a key exists
    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Get all keys
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.lock().keys().cloned().collect()
    }

    /// Keys written via `set`, in call order
    #[must_use]
    pub fn write_log(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    /// Get the number of stored items
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    /// Check if storage is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    fn check_writable(&self) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("mock storage write failure".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MockStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.check_writable()?;
        if self.failing_keys.lock().contains(key) {
            return Err(StorageError::Backend(format!("mock storage write failure for {key}")));
        }
        self.writes.lock().push(key.to_string());
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.check_writable()?;
        self.data.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.check_writable()?;
        self.data.lock().clear();
        Ok(())
    }
}
