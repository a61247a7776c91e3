//! Token grants
//!
//! Three grant shapes hit the token endpoint: `authorization_code` (with an
//! editable parameter set), `refresh_token` and `client_credentials`. Stored
//! tokens change only after a 2xx reply that parses.

use std::sync::Arc;

use flowlab_domain::constants::{
    DEFAULT_SCOPE, GRANT_AUTHORIZATION_CODE, GRANT_CLIENT_CREDENTIALS, GRANT_REFRESH_TOKEN,
};
use flowlab_domain::{FlowError, FlowType, OAuthErrorBody, ProviderConfig, Result, TokenResponse};
use tracing::{debug, info};

use super::{parse_json, reject};
use crate::ports::{FormParams, ProviderTransport};
use crate::session::SessionStore;

/// Ordered, freely editable token request parameters
///
/// Keys may be added, removed or renamed before submission, including into
/// shapes the provider should reject.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExchangeParams {
    entries: Vec<(String, String)>,
}

impl ExchangeParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key, keeping its original position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder form of [`Self::set`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Rename a key in place; an existing entry under `to` is replaced
    ///
    /// Returns `false` when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains(from);
        }
        if !self.contains(from) {
            return false;
        }
        self.remove(to);
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == from) {
            entry.0 = to.to_string();
        }
        true
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields that will actually be sent: blank values are dropped
    #[must_use]
    pub fn form_pairs(&self) -> FormParams {
        self.entries.iter().filter(|(_, v)| !v.trim().is_empty()).cloned().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExchangeParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

/// Default authorization-code exchange parameters
///
/// `client_secret` is appended only for the confidential flow; the public
/// flow never carries the key.
pub fn default_exchange_params(
    config: &ProviderConfig,
    session: &SessionStore,
    code: &str,
) -> Result<ExchangeParams> {
    let mut params = ExchangeParams::new()
        .with("client_id", config.client_id.as_str())
        .with("code", code)
        .with("code_verifier", session.code_verifier()?)
        .with("grant_type", GRANT_AUTHORIZATION_CODE)
        .with("redirect_uri", config.redirect_uri.as_str());

    if session.flow()? == FlowType::Confidential {
        params.set("client_secret", config.secret_or_empty());
    }
    Ok(params)
}

/// Drives the token endpoint grants and persists their results
#[derive(Clone)]
pub struct TokenExchangeEngine {
    config: Arc<ProviderConfig>,
    session: SessionStore,
    transport: Arc<dyn ProviderTransport>,
}

impl std::fmt::Debug for TokenExchangeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenExchangeEngine").field("config", &self.config).finish_non_exhaustive()
    }
}

impl TokenExchangeEngine {
    pub fn new(
        config: Arc<ProviderConfig>,
        session: SessionStore,
        transport: Arc<dyn ProviderTransport>,
    ) -> Self {
        Self { config, session, transport }
    }

    pub fn default_exchange_params(&self, code: &str) -> Result<ExchangeParams> {
        default_exchange_params(&self.config, &self.session, code)
    }

    /// Submit an authorization-code exchange with the given parameters
    ///
    /// # Errors
    /// `FlowError::TokenExchange` on a non-2xx reply, `Network` on transport
    /// failure, `InvalidResponse` on an unparsable success body.
    pub async fn exchange_code(&self, params: &ExchangeParams) -> Result<TokenResponse> {
        let response = self
            .request_tokens("token_exchange", params, |status, provider_error| {
                FlowError::TokenExchange { status, provider_error }
            })
            .await?;

        self.session.store_tokens(&response)?;
        info!(grant_type = GRANT_AUTHORIZATION_CODE, "authorization code exchanged");
        Ok(response)
    }

    /// Refresh-token grant
    ///
    /// Every stored token is overwritten by the response; a field the
    /// provider omits is blanked.
    pub async fn refresh(&self) -> Result<TokenResponse> {
        let refresh_token = self.session.refresh_token()?;
        if refresh_token.is_empty() {
            return Err(FlowError::NoRefreshToken);
        }

        let mut params = ExchangeParams::new()
            .with("client_id", self.config.client_id.as_str())
            .with("refresh_token", refresh_token)
            .with("grant_type", GRANT_REFRESH_TOKEN);
        if self.session.flow()? == FlowType::Confidential {
            params.set("client_secret", self.config.secret_or_empty());
        }

        let response = self
            .request_tokens("refresh", &params, |status, provider_error| FlowError::Refresh {
                status,
                provider_error,
            })
            .await?;

        self.session.store_tokens(&response)?;
        info!(grant_type = GRANT_REFRESH_TOKEN, "tokens refreshed");
        Ok(response)
    }

    /// Client-credentials grant
    ///
    /// Stores only the access token and switches the session to the
    /// confidential flow.
    pub async fn client_credentials(&self) -> Result<TokenResponse> {
        let secret = self
            .config
            .client_secret
            .as_deref()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                FlowError::Config("client credentials grant requires a client secret".to_string())
            })?;

        let params = ExchangeParams::new()
            .with("client_id", self.config.client_id.as_str())
            .with("client_secret", secret)
            .with("grant_type", GRANT_CLIENT_CREDENTIALS)
            .with("scope", DEFAULT_SCOPE);

        let response = self
            .request_tokens("client_credentials", &params, |status, provider_error| {
                FlowError::ClientCredentials { status, provider_error }
            })
            .await?;

        self.session.set_access_token(response.access_token.as_deref().unwrap_or_default())?;
        self.session.set_flow(FlowType::Confidential)?;
        info!(grant_type = GRANT_CLIENT_CREDENTIALS, "client credentials token stored");
        Ok(response)
    }

    async fn request_tokens<F>(
        &self,
        operation: &'static str,
        params: &ExchangeParams,
        make_error: F,
    ) -> Result<TokenResponse>
    where
        F: FnOnce(u16, Option<OAuthErrorBody>) -> FlowError + Send,
    {
        let form = params.form_pairs();
        debug!(
            operation,
            fields = ?form.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
            "posting token request"
        );

        let reply = self.transport.post_form(&self.config.token_url(), &[], &form).await?;
        if !reply.is_success() {
            return Err(reject(operation, &reply, make_error));
        }
        parse_json(operation, &reply)
    }
}

#[cfg(test)]
mod tests {
    use flowlab_common::MemoryStore;
    use serde_json::json;

    use super::*;
    use crate::testing::MockTransport;

    struct Fixture {
        engine: TokenExchangeEngine,
        session: SessionStore,
        transport: Arc<MockTransport>,
    }

    fn fixture(secret: Option<&str>) -> Fixture {
        let mut config =
            ProviderConfig::new("https://id.example.com", "client-1", "http://localhost/cb");
        config.client_secret = secret.map(str::to_string);
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let transport = Arc::new(MockTransport::new());
        let engine = TokenExchangeEngine::new(Arc::new(config), session.clone(), transport.clone());
        Fixture { engine, session, transport }
    }

    #[test]
    fn test_params_editing() {
        let mut params = ExchangeParams::new().with("a", "1").with("b", "2").with("c", "3");

        params.set("a", "10");
        assert!(params.rename("b", "c"));
        assert!(!params.rename("missing", "x"));
        assert_eq!(params.remove("zzz"), None);

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "10"), ("c", "2")]);
    }

    #[test]
    fn test_form_pairs_drop_blank_values() {
        let params: ExchangeParams =
            [("code", "abc"), ("code_verifier", ""), ("client_secret", "  ")].into_iter().collect();

        assert_eq!(params.form_pairs(), vec![("code".to_string(), "abc".to_string())]);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_default_params_public_has_no_secret_key() {
        let f = fixture(Some("s3cret"));
        f.session.set_code_verifier("verifier").unwrap();

        let params = f.engine.default_exchange_params("the-code").unwrap();

        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["client_id", "code", "code_verifier", "grant_type", "redirect_uri"]);
        assert_eq!(params.get("code_verifier"), Some("verifier"));
        assert_eq!(params.get("grant_type"), Some("authorization_code"));
    }

    #[test]
    fn test_default_params_confidential_has_secret() {
        let f = fixture(Some("s3cret"));
        f.session.set_flow(FlowType::Confidential).unwrap();

        let params = f.engine.default_exchange_params("the-code").unwrap();
        assert_eq!(params.get("client_secret"), Some("s3cret"));
    }

    #[tokio::test]
    async fn test_exchange_success_stores_tokens() {
        let f = fixture(None);
        f.transport.push_json(200, json!({"access_token": "at", "id_token": "it"}));
        f.session.set_refresh_token("stale").unwrap();

        let params = f.engine.default_exchange_params("c1").unwrap();
        let response = f.engine.exchange_code(&params).await.unwrap();

        assert_eq!(response.access_token.as_deref(), Some("at"));
        assert_eq!(f.session.access_token().unwrap(), "at");
        assert_eq!(f.session.refresh_token().unwrap(), "");
        assert_eq!(f.session.id_token().unwrap(), "it");

        let request = f.transport.last_request().unwrap();
        assert_eq!(request.url, "https://id.example.com/oauth/token");
        // Empty verifier was dropped from the body
        assert_eq!(request.form_value("code_verifier"), None);
        assert_eq!(request.form_value("code"), Some("c1"));
    }

    #[tokio::test]
    async fn test_exchange_failure_parses_provider_error() {
        let f = fixture(None);
        f.session.set_access_token("keep").unwrap();
        f.transport.push_json(400, json!({"error": "invalid_grant", "error_description": "used"}));

        let params = f.engine.default_exchange_params("c1").unwrap();
        let err = f.engine.exchange_code(&params).await.unwrap_err();

        match err {
            FlowError::TokenExchange { status, provider_error: Some(body) } => {
                assert_eq!(status, 400);
                assert_eq!(body.error, "invalid_grant");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.session.access_token().unwrap(), "keep");
    }

    #[tokio::test]
    async fn test_exchange_failure_with_unparsable_body() {
        let f = fixture(None);
        f.transport.push_reply(502, "<html>bad gateway</html>");

        let err = f.engine.exchange_code(&ExchangeParams::new()).await.unwrap_err();
        assert_eq!(err, FlowError::TokenExchange { status: 502, provider_error: None });
    }

    #[tokio::test]
    async fn test_refresh_requires_token() {
        let f = fixture(None);
        assert_eq!(f.engine.refresh().await.unwrap_err(), FlowError::NoRefreshToken);
        assert!(f.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_overwrites_all_tokens() {
        let f = fixture(Some("s3cret"));
        f.session.set_refresh_token("r1").unwrap();
        f.session.set_id_token("old-id").unwrap();
        f.session.set_flow(FlowType::Confidential).unwrap();
        f.transport.push_json(200, json!({"access_token": "a2", "refresh_token": "r2"}));

        f.engine.refresh().await.unwrap();

        let request = f.transport.last_request().unwrap();
        assert_eq!(request.form_value("grant_type"), Some("refresh_token"));
        assert_eq!(request.form_value("refresh_token"), Some("r1"));
        assert_eq!(request.form_value("client_secret"), Some("s3cret"));
        assert_eq!(f.session.access_token().unwrap(), "a2");
        assert_eq!(f.session.refresh_token().unwrap(), "r2");
        assert_eq!(f.session.id_token().unwrap(), "");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_tokens() {
        let f = fixture(None);
        f.session.set_refresh_token("r1").unwrap();
        f.transport.push_json(401, json!({"error": "invalid_grant"}));

        let err = f.engine.refresh().await.unwrap_err();

        assert!(matches!(err, FlowError::Refresh { status: 401, .. }));
        assert_eq!(f.session.refresh_token().unwrap(), "r1");
        assert!(f.transport.last_request().unwrap().form_value("client_secret").is_none());
    }

    #[tokio::test]
    async fn test_client_credentials() {
        let f = fixture(Some("s3cret"));
        f.session.set_refresh_token("untouched").unwrap();
        f.transport.push_json(200, json!({"access_token": "cc", "refresh_token": "ignored"}));

        f.engine.client_credentials().await.unwrap();

        let request = f.transport.last_request().unwrap();
        assert_eq!(request.form_value("grant_type"), Some("client_credentials"));
        assert_eq!(request.form_value("scope"), Some("email profile"));
        assert_eq!(request.form_value("client_secret"), Some("s3cret"));
        assert_eq!(f.session.access_token().unwrap(), "cc");
        assert_eq!(f.session.refresh_token().unwrap(), "untouched");
        assert_eq!(f.session.flow().unwrap(), FlowType::Confidential);
    }

    #[tokio::test]
    async fn test_client_credentials_without_secret() {
        let f = fixture(None);
        assert!(matches!(f.engine.client_credentials().await, Err(FlowError::Config(_))));
    }

    #[tokio::test]
    async fn test_success_with_invalid_json() {
        let f = fixture(None);
        f.transport.push_reply(200, "not json");

        let err = f.engine.exchange_code(&ExchangeParams::new()).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidResponse(_)));
    }
}
