//! Error types used throughout the application
//!
//! [`FlowError`] is the closed set of failures any flow operation can report.
//! Every variant belongs to exactly one [`ErrorCategory`]: caller-input
//! problems caught before the network (`Validation`), transport failures
//! (`Network`), non-2xx provider replies (`Provider`), plus the ambient
//! storage/configuration/internal buckets.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{OAuthErrorBody, TokenKind};

/// Main error type for flowlab
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum FlowError {
    #[error("Authorization failed: {error}{}", describe(.description.as_deref()))]
    Authorization { error: String, description: Option<String> },

    #[error("Authorization response is missing the code parameter")]
    MissingCode,

    #[error("Unexpected state parameter {received:?}: state was removed from the request")]
    UnexpectedState { received: String },

    #[error("State mismatch: received {received:?}, expected {expected:?}")]
    StateMismatch { received: Option<String>, expected: String },

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("No {0} token available")]
    NoToken(TokenKind),

    #[error("Token exchange failed (HTTP {status}){}", provider_suffix(.provider_error.as_ref()))]
    TokenExchange { status: u16, provider_error: Option<OAuthErrorBody> },

    #[error("Token refresh failed (HTTP {status}){}", provider_suffix(.provider_error.as_ref()))]
    Refresh { status: u16, provider_error: Option<OAuthErrorBody> },

    #[error("Client credentials grant failed (HTTP {status}){}", provider_suffix(.provider_error.as_ref()))]
    ClientCredentials { status: u16, provider_error: Option<OAuthErrorBody> },

    #[error("Token introspection failed (HTTP {status}){}", provider_suffix(.provider_error.as_ref()))]
    Introspection { status: u16, provider_error: Option<OAuthErrorBody> },

    #[error("Token revocation failed (HTTP {status}){}", provider_suffix(.provider_error.as_ref()))]
    Revocation { status: u16, provider_error: Option<OAuthErrorBody> },

    #[error("User info request failed (HTTP {status})")]
    UserInfo { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("Operation already in progress: {0}")]
    Busy(String),
}

/// Result type alias for flowlab operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Coarse classification of a [`FlowError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Caller-input problem detected before any network call
    Validation,
    /// Transport-level failure
    Network,
    /// Non-2xx response from the provider
    Provider,
    Storage,
    Configuration,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Provider => "provider",
            Self::Storage => "storage",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl FlowError {
    /// Classify this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCode
            | Self::UnexpectedState { .. }
            | Self::StateMismatch { .. }
            | Self::NoRefreshToken
            | Self::NoToken(_)
            | Self::InvalidInput(_)
            | Self::Busy(_) => ErrorCategory::Validation,
            Self::Network(_) => ErrorCategory::Network,
            Self::Authorization { .. }
            | Self::TokenExchange { .. }
            | Self::Refresh { .. }
            | Self::ClientCredentials { .. }
            | Self::Introspection { .. }
            | Self::Revocation { .. }
            | Self::UserInfo { .. } => ErrorCategory::Provider,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::InvalidResponse(_) => ErrorCategory::Internal,
        }
    }

    /// Whether re-invoking the operation may succeed without changing input
    ///
    /// Nothing retries automatically; this only informs the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status of a provider rejection
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::TokenExchange { status, .. }
            | Self::Refresh { status, .. }
            | Self::ClientCredentials { status, .. }
            | Self::Introspection { status, .. }
            | Self::Revocation { status, .. }
            | Self::UserInfo { status } => Some(*status),
            _ => None,
        }
    }

    /// Parsed provider error body, when the provider sent one
    #[must_use]
    pub const fn provider_error(&self) -> Option<&OAuthErrorBody> {
        match self {
            Self::TokenExchange { provider_error, .. }
            | Self::Refresh { provider_error, .. }
            | Self::ClientCredentials { provider_error, .. }
            | Self::Introspection { provider_error, .. }
            | Self::Revocation { provider_error, .. } => provider_error.as_ref(),
            _ => None,
        }
    }
}

fn describe(description: Option<&str>) -> String {
    description.map(|d| format!(" ({d})")).unwrap_or_default()
}

fn provider_suffix(provider_error: Option<&OAuthErrorBody>) -> String {
    provider_error.map(|body| format!(": {body}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(error: &str, description: Option<&str>) -> OAuthErrorBody {
        OAuthErrorBody {
            error: error.to_string(),
            error_description: description.map(str::to_string),
            error_uri: None,
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(FlowError::MissingCode.category(), ErrorCategory::Validation);
        assert_eq!(
            FlowError::StateMismatch { received: None, expected: "abc".into() }.category(),
            ErrorCategory::Validation
        );
        assert_eq!(FlowError::NoToken(TokenKind::Access).category(), ErrorCategory::Validation);
        assert_eq!(FlowError::Network("reset".into()).category(), ErrorCategory::Network);
        assert_eq!(
            FlowError::Revocation { status: 400, provider_error: None }.category(),
            ErrorCategory::Provider
        );
        assert_eq!(FlowError::Storage("disk".into()).category(), ErrorCategory::Storage);
        assert_eq!(FlowError::Config("x".into()).category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_only_network_is_retryable() {
        assert!(FlowError::Network("timeout".into()).is_retryable());
        assert!(!FlowError::TokenExchange { status: 503, provider_error: None }.is_retryable());
        assert!(!FlowError::NoRefreshToken.is_retryable());
    }

    #[test]
    fn test_display_includes_provider_error() {
        let err = FlowError::TokenExchange {
            status: 400,
            provider_error: Some(body("invalid_grant", Some("code expired"))),
        };
        assert_eq!(
            err.to_string(),
            "Token exchange failed (HTTP 400): invalid_grant: code expired"
        );

        let generic = FlowError::Refresh { status: 500, provider_error: None };
        assert_eq!(generic.to_string(), "Token refresh failed (HTTP 500)");
    }

    #[test]
    fn test_authorization_display() {
        let err = FlowError::Authorization {
            error: "access_denied".into(),
            description: Some("user cancelled".into()),
        };
        assert_eq!(err.to_string(), "Authorization failed: access_denied (user cancelled)");
    }

    #[test]
    fn test_status_and_provider_error_accessors() {
        let err = FlowError::Introspection {
            status: 401,
            provider_error: Some(body("invalid_client", None)),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.provider_error().map(|b| b.error.as_str()), Some("invalid_client"));
        assert_eq!(FlowError::MissingCode.status(), None);
    }

    #[test]
    fn test_serde_tagged_representation() {
        let err = FlowError::NoToken(TokenKind::Refresh);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"type": "NoToken", "details": "refresh"}));

        let back: FlowError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
