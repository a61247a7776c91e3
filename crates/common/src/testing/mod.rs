//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of common traits
//!
//! ## Usage
//!
//! ```rust
//! use flowlab_common::testing::MockStorage;
//! use flowlab_common::KeyValueStore;
//!
//! let storage = MockStorage::new();
//! storage.fail_writes(true);
//! assert!(storage.set("state", "abc").is_err());
//! ```

pub mod mocks;

pub use mocks::MockStorage;
