//! Key-value storage primitives
//!
//! The OAuth session is persisted as a flat set of string entries, the same
//! way a browser would keep it in local storage. This module defines the
//! [`KeyValueStore`] abstraction that the session layer writes through, and an
//! in-memory implementation used by tests and short-lived processes.

pub mod error;
pub mod memory;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;

/// Flat string key-value persistence
///
/// All mutations are last-writer-wins overwrites of single keys; there are no
/// transactions. Implementations must be safe to share across threads.
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `Ok(None)` when the key was never written or was removed
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite a value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key (idempotent)
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Delete every key
    fn clear(&self) -> StorageResult<()>;
}
