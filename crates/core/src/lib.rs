//! # flowlab Core
//!
//! OAuth 2.0 / OIDC flow engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - The typed session record and the CSRF state lifecycle
//! - Authorization URL construction with PKCE and prompt handling
//! - Client authentication, token grants, introspection and revocation
//! - Callback validation
//! - [`FlowService`], which ties the above together
//!
//! ## Architecture Principles
//! - Depends only on `flowlab-common` and `flowlab-domain`
//! - No HTTP, file or socket code
//! - The provider is reached through [`ports::ProviderTransport`]
//! - Storage is any [`flowlab_common::KeyValueStore`]

pub mod authorize;
pub mod callback;
pub mod jwt;
pub mod ports;
pub mod service;
pub mod session;
pub mod token;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use authorize::{canonical_prompt, AuthRequest, AuthRequestBuilder};
pub use callback::{CallbackParams, CallbackValidator, ValidatedCallback};
pub use ports::{FormParams, Headers, HttpReply, ProviderTransport};
pub use service::FlowService;
pub use session::{SessionStore, StateManager};
pub use token::{
    default_exchange_params, ClientAuthenticator, ClientCredentials, ExchangeParams,
    TokenExchangeEngine, TokenOpsClient,
};
