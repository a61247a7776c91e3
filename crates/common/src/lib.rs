//! Shared building blocks for the flowlab crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: key-value storage primitives (`storage`)
//! - `crypto`: PKCE verifier/challenge and CSRF state generation (`auth`)
//! - `observability`: tracing inside the storage backends
//! - `test-utils`: in-memory mocks for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod storage;

// Crypto tier
// -----------------------------------------------------------------
#[cfg(feature = "crypto")]
pub mod auth;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "crypto")]
pub use auth::pkce::{generate_code_challenge, generate_code_verifier, generate_state};
#[cfg(feature = "foundation")]
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
