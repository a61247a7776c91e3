//! Token endpoint operations
//!
//! - [`client_auth`]: credentials for token-endpoint calls
//! - [`exchange`]: authorization-code, refresh and client-credentials grants
//! - [`ops`]: introspection, revocation and userinfo

pub mod client_auth;
pub mod exchange;
pub mod ops;

pub use client_auth::{ClientAuthenticator, ClientCredentials};
pub use exchange::{default_exchange_params, ExchangeParams, TokenExchangeEngine};
pub use ops::TokenOpsClient;

use flowlab_domain::{FlowError, OAuthErrorBody, Result};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::ports::HttpReply;

/// Turn a non-2xx reply into the operation's provider error
pub(crate) fn reject<F>(operation: &'static str, reply: &HttpReply, make: F) -> FlowError
where
    F: FnOnce(u16, Option<OAuthErrorBody>) -> FlowError,
{
    let provider_error = OAuthErrorBody::parse(&reply.body);
    warn!(
        operation,
        status = reply.status,
        error = provider_error.as_ref().map(|body| body.error.as_str()),
        "provider rejected request"
    );
    make(reply.status, provider_error)
}

/// Decode a successful JSON reply
pub(crate) fn parse_json<T: DeserializeOwned>(operation: &'static str, reply: &HttpReply) -> Result<T> {
    serde_json::from_str(&reply.body)
        .map_err(|e| FlowError::InvalidResponse(format!("{operation}: {e}")))
}
