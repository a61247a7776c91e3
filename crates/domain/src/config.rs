//! Configuration structures
//!
//! The provider settings are fixed for the lifetime of the process. They are
//! loaded once (see `flowlab_infra::config`) and shared read-only.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    AUTHORIZE_PATH, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_SESSION_PATH, DEFAULT_USER_AGENT,
    INTROSPECTION_PATH, REVOCATION_PATH, TOKEN_PATH, USERINFO_PATH,
};
use crate::errors::{FlowError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Identity provider and client registration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider base URL, e.g. `https://id.example.com`
    pub base_url: String,
    pub client_id: String,
    /// Only needed for confidential flows, client credentials and
    /// `client_secret_post`
    #[serde(default)]
    pub client_secret: Option<String>,
    pub redirect_uri: String,
}

// Manual impl keeps the secret out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a public-client configuration
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Attach a client secret
    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Client secret, or `""` when none is configured
    #[must_use]
    pub fn secret_or_empty(&self) -> &str {
        self.client_secret.as_deref().unwrap_or_default()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    #[must_use]
    pub fn authorize_url(&self) -> String {
        self.endpoint(AUTHORIZE_PATH)
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        self.endpoint(TOKEN_PATH)
    }

    #[must_use]
    pub fn introspection_url(&self) -> String {
        self.endpoint(INTROSPECTION_PATH)
    }

    #[must_use]
    pub fn revocation_url(&self) -> String {
        self.endpoint(REVOCATION_PATH)
    }

    #[must_use]
    pub fn userinfo_url(&self) -> String {
        self.endpoint(USERINFO_PATH)
    }

    /// Check required fields and URL shapes
    ///
    /// # Errors
    /// Returns `FlowError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(FlowError::Config("client_id must not be empty".to_string()));
        }
        if self.redirect_uri.trim().is_empty() {
            return Err(FlowError::Config("redirect_uri must not be empty".to_string()));
        }
        require_http_url("base_url", &self.base_url)?;
        require_http_url("redirect_uri", &self.redirect_uri)?;
        Ok(())
    }
}

fn require_http_url(field: &str, value: &str) -> Result<()> {
    let parsed = Url::parse(value)
        .map_err(|e| FlowError::Config(format!("{field} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(FlowError::Config(format!("{field} must use http or https, got {other}"))),
    }
}

/// Session persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// JSON file holding the session
    pub session_path: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { session_path: DEFAULT_SESSION_PATH.to_string() }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl AppConfig {
    /// Configuration with default storage and HTTP settings
    #[must_use]
    pub fn new(provider: ProviderConfig) -> Self {
        Self { provider, storage: StorageSettings::default(), http: HttpSettings::default() }
    }

    /// Validate the whole configuration
    ///
    /// # Errors
    /// Returns `FlowError::Config` on the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        if self.http.timeout_seconds == 0 {
            return Err(FlowError::Config("http.timeout_seconds must be positive".to_string()));
        }
        if self.storage.session_path.trim().is_empty() {
            return Err(FlowError::Config("storage.session_path must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderConfig {
        ProviderConfig::new("https://id.example.com/", "client-1", "http://localhost:3000/cb")
    }

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let config = provider();
        assert_eq!(config.authorize_url(), "https://id.example.com/oauth/authorize");
        assert_eq!(config.token_url(), "https://id.example.com/oauth/token");
        assert_eq!(config.introspection_url(), "https://id.example.com/oauth/token_info");
        assert_eq!(config.revocation_url(), "https://id.example.com/oauth/token/revoke");
        assert_eq!(config.userinfo_url(), "https://id.example.com/oauth/userinfo");
    }

    #[test]
    fn test_validate() {
        assert!(AppConfig::new(provider()).validate().is_ok());

        let mut bad = provider();
        bad.client_id = "  ".into();
        assert!(matches!(bad.validate(), Err(FlowError::Config(_))));

        let mut bad = provider();
        bad.base_url = "id.example.com".into();
        assert!(matches!(bad.validate(), Err(FlowError::Config(_))));

        let mut bad = provider();
        bad.base_url = "ftp://id.example.com".into();
        assert!(bad.validate().is_err());

        let mut config = AppConfig::new(provider());
        config.http.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = provider().with_client_secret("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(config.secret_or_empty(), "hunter2");
    }

    #[test]
    fn test_defaults_apply_when_sections_missing() {
        let config: AppConfig = serde_json::from_str(
            r#"{"provider":{"base_url":"https://x","client_id":"c","redirect_uri":"http://l/cb"}}"#,
        )
        .unwrap();
        assert_eq!(config.storage.session_path, ".flowlab/session.json");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.provider.client_secret, None);
    }
}
