//! # flowlab
//!
//! Command-line front end for the OAuth flow engine.
//!
//! This crate contains:
//! - Argument parsing (`cli`)
//! - Command dispatch against [`flowlab_core::FlowService`] (`commands`)
//! - Application context (dependency injection)
//! - Logging bootstrap
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires infra adapters into the core service

pub mod cli;
pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use cli::Cli;
pub use commands::execute;
pub use context::AppContext;
