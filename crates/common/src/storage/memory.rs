//! In-memory [`KeyValueStore`]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{KeyValueStore, StorageResult};

/// Process-local key-value store
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether no key is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        #[cfg(feature = "observability")]
        tracing::debug!(keys = self.len(), "clearing in-memory store");

        self.data.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::memory.
    use super::*;

    #[test]
    fn test_set_get_overwrite() {
        let store = MemoryStore::new();
        assert_eq!(store.get("state").unwrap(), None);

        store.set("state", "abc").unwrap();
        store.set("state", "def").unwrap();

        assert_eq!(store.get("state").unwrap(), Some("def".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = MemoryStore::new();
        store.set("accessToken", "token").unwrap();

        store.remove("accessToken").unwrap();
        store.remove("accessToken").unwrap();

        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.set("flow", "confidential").unwrap();

        assert_eq!(store.get("flow").unwrap(), Some("confidential".to_string()));

        store.clear().unwrap();
        assert!(clone.is_empty());
    }
}
