//! # flowlab Domain
//!
//! Domain types and models for the flowlab OAuth harness.
//!
//! This crate contains:
//! - The persisted session model and its enums (flow, state mode, client
//!   authentication method, PKCE challenge method)
//! - Token endpoint wire types
//! - Provider and application configuration structures
//! - The closed error taxonomy and Result definition
//! - Storage keys, endpoint paths and other constants
//!
//! ## Architecture
//! - No dependencies on other flowlab crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
