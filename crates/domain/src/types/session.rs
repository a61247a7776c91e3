//! Session model
//!
//! One logical session per process. Every field is persisted as a string
//! under the key listed in [`crate::constants::SESSION_KEYS`]; an empty
//! string means "absent".

use serde::{Deserialize, Serialize};

use crate::impl_wire_value_conversions;

/// Whether the client secret accompanies token-endpoint calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// Browser-only client, no secret
    #[default]
    Public,
    /// Server-side client holding a secret
    Confidential,
}

impl_wire_value_conversions!(FlowType {
    Public => "public",
    Confidential => "confidential",
});

/// Whether the CSRF `state` parameter takes part in the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMode {
    /// State is sent (even when blank) and must round-trip exactly
    #[default]
    Enabled,
    /// State is omitted from the request and must be absent on callback
    Removed,
}

impl_wire_value_conversions!(StateMode {
    Enabled => "enabled",
    Removed => "removed",
});

/// How the client authenticates to token, introspection and revocation
/// endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
    /// `Authorization: Basic base64(id:secret)`
    #[default]
    ClientSecretBasic,
    /// `client_id` and `client_secret` in the form body
    ClientSecretPost,
}

impl_wire_value_conversions!(ClientAuthMethod {
    ClientSecretBasic => "client_secret_basic",
    ClientSecretPost => "client_secret_post",
});

/// PKCE `code_challenge_method` choice
///
/// `Omit` keeps PKCE enabled client-side but sends neither challenge
/// parameter, which is useful for testing provider enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    #[default]
    #[serde(rename = "S256")]
    S256,
    #[serde(rename = "plain")]
    Plain,
    #[serde(rename = "omit")]
    Omit,
}

impl_wire_value_conversions!(CodeChallengeMethod {
    S256 => "S256",
    Plain => "plain",
    Omit => "omit",
});

/// Token selector for introspection and revocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl_wire_value_conversions!(TokenKind {
    Access => "access",
    Refresh => "refresh",
});

impl TokenKind {
    /// RFC 7009 `token_type_hint` value
    #[must_use]
    pub const fn type_hint(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// Snapshot of every persisted session field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub code_verifier: String,
    pub state: String,
    pub state_mode: StateMode,
    pub flow: FlowType,
    pub prompt: String,
    pub client_auth_method: ClientAuthMethod,
}

impl Session {
    /// Stored token of the given kind (empty when absent)
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_token,
            TokenKind::Refresh => &self.refresh_token,
        }
    }

    /// Whether any of the three tokens is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty() || !self.refresh_token.is_empty() || !self.id_token.is_empty()
    }
}
