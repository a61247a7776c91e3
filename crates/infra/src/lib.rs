//! # flowlab Infrastructure
//!
//! Adapters implementing the ports defined in `flowlab-core`.
//!
//! This crate contains:
//! - The reqwest-backed provider transport
//! - JSON file persistence for the session
//! - The loopback callback server (axum)
//! - Configuration loading from the environment and files
//!
//! ## Architecture
//! - Implements traits defined in `flowlab-core` and `flowlab-common`
//! - Contains all "impure" code (network, filesystem)

pub mod callback;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use callback::CallbackServer;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use storage::JsonFileStore;
