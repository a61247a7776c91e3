//! Introspection, revocation and userinfo

use std::sync::Arc;

use flowlab_domain::{FlowError, ProviderConfig, Result, TokenKind, UserInfo};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::client_auth::ClientAuthenticator;
use super::{parse_json, reject};
use crate::ports::ProviderTransport;
use crate::session::SessionStore;

/// Token operations against the provider's auxiliary endpoints
#[derive(Clone)]
pub struct TokenOpsClient {
    config: Arc<ProviderConfig>,
    session: SessionStore,
    auth: ClientAuthenticator,
    transport: Arc<dyn ProviderTransport>,
}

impl std::fmt::Debug for TokenOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenOpsClient").field("config", &self.config).finish_non_exhaustive()
    }
}

impl TokenOpsClient {
    pub fn new(
        config: Arc<ProviderConfig>,
        session: SessionStore,
        transport: Arc<dyn ProviderTransport>,
    ) -> Self {
        let auth = ClientAuthenticator::new(Arc::clone(&config), session.clone());
        Self { config, session, auth, transport }
    }

    fn require_token(&self, kind: TokenKind) -> Result<String> {
        let token = self.session.token(kind)?;
        if token.is_empty() {
            return Err(FlowError::NoToken(kind));
        }
        Ok(token)
    }

    /// Introspect the stored token of the given kind
    ///
    /// Returns the provider's JSON verbatim.
    pub async fn introspect(&self, kind: TokenKind) -> Result<Value> {
        let token = self.require_token(kind)?;
        let credentials = self.auth.credentials()?;

        let mut form = vec![("token".to_string(), token)];
        form.extend(credentials.body);

        debug!(token_kind = %kind, "introspecting token");
        let reply =
            self.transport.post_form(&self.config.introspection_url(), &credentials.headers, &form).await?;
        if !reply.is_success() {
            return Err(reject("introspection", &reply, |status, provider_error| {
                FlowError::Introspection { status, provider_error }
            }));
        }
        parse_json("introspection", &reply)
    }

    /// Revoke the stored token of the given kind
    ///
    /// The local copy is blanked only after the provider confirms; the other
    /// tokens are never touched.
    pub async fn revoke(&self, kind: TokenKind) -> Result<()> {
        let token = self.require_token(kind)?;
        let credentials = self.auth.credentials()?;

        let mut form = vec![
            ("token".to_string(), token),
            ("token_type_hint".to_string(), kind.type_hint().to_string()),
        ];
        form.extend(credentials.body);

        let reply =
            self.transport.post_form(&self.config.revocation_url(), &credentials.headers, &form).await?;
        if !reply.is_success() {
            return Err(reject("revocation", &reply, |status, provider_error| {
                FlowError::Revocation { status, provider_error }
            }));
        }

        self.session.clear_token(kind)?;
        info!(token_kind = %kind, "token revoked");
        Ok(())
    }

    /// Fetch the OIDC userinfo for the stored access token
    pub async fn user_info(&self) -> Result<UserInfo> {
        let token = self.require_token(TokenKind::Access)?;
        let headers = vec![("Authorization".to_string(), format!("Bearer {token}"))];

        let reply = self.transport.get(&self.config.userinfo_url(), &headers).await?;
        if !reply.is_success() {
            warn!(status = reply.status, "userinfo request rejected");
            return Err(FlowError::UserInfo { status: reply.status });
        }
        parse_json("userinfo", &reply)
    }
}

#[cfg(test)]
mod tests {
    use flowlab_common::MemoryStore;
    use flowlab_domain::ClientAuthMethod;
    use serde_json::json;

    use super::*;
    use crate::testing::MockTransport;

    fn client() -> (TokenOpsClient, SessionStore, Arc<MockTransport>) {
        let config = ProviderConfig::new("https://id.example.com", "client", "http://l/cb")
            .with_client_secret("secret");
        let session = SessionStore::new(Arc::new(MemoryStore::new()));
        let transport = Arc::new(MockTransport::new());
        let ops = TokenOpsClient::new(Arc::new(config), session.clone(), transport.clone());
        (ops, session, transport)
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_network() {
        let (ops, _, transport) = client();

        assert_eq!(ops.introspect(TokenKind::Refresh).await.unwrap_err(), FlowError::NoToken(TokenKind::Refresh));
        assert_eq!(ops.revoke(TokenKind::Access).await.unwrap_err(), FlowError::NoToken(TokenKind::Access));
        assert_eq!(ops.user_info().await.unwrap_err(), FlowError::NoToken(TokenKind::Access));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_introspect_basic_auth() {
        let (ops, session, transport) = client();
        session.set_access_token("at").unwrap();
        transport.push_json(200, json!({"active": true, "scope": "email profile"}));

        let result = ops.introspect(TokenKind::Access).await.unwrap();

        assert_eq!(result["active"], json!(true));
        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://id.example.com/oauth/token_info");
        assert_eq!(request.header("Authorization"), Some("Basic Y2xpZW50OnNlY3JldA=="));
        assert_eq!(request.form, vec![("token".to_string(), "at".to_string())]);
    }

    #[tokio::test]
    async fn test_introspect_post_auth() {
        let (ops, session, transport) = client();
        session.set_refresh_token("rt").unwrap();
        session.set_client_auth_method(ClientAuthMethod::ClientSecretPost).unwrap();
        transport.push_json(200, json!({"active": false}));

        ops.introspect(TokenKind::Refresh).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.header("Authorization"), None);
        assert_eq!(request.form_value("token"), Some("rt"));
        assert_eq!(request.form_value("client_id"), Some("client"));
        assert_eq!(request.form_value("client_secret"), Some("secret"));
    }

    #[tokio::test]
    async fn test_introspect_failure() {
        let (ops, session, transport) = client();
        session.set_access_token("at").unwrap();
        transport.push_json(401, json!({"error": "invalid_client"}));

        let err = ops.introspect(TokenKind::Access).await.unwrap_err();
        assert!(matches!(err, FlowError::Introspection { status: 401, provider_error: Some(_) }));
    }

    #[tokio::test]
    async fn test_revoke_success_clears_only_target() {
        let (ops, session, transport) = client();
        session.set_access_token("at").unwrap();
        session.set_refresh_token("rt").unwrap();
        session.set_id_token("it").unwrap();
        transport.push_reply(200, "");

        ops.revoke(TokenKind::Refresh).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://id.example.com/oauth/token/revoke");
        assert_eq!(request.form_value("token_type_hint"), Some("refresh_token"));
        assert_eq!(session.refresh_token().unwrap(), "");
        assert_eq!(session.access_token().unwrap(), "at");
        assert_eq!(session.id_token().unwrap(), "it");
    }

    #[tokio::test]
    async fn test_revoke_failure_keeps_token() {
        let (ops, session, transport) = client();
        session.set_access_token("at").unwrap();
        transport.push_reply(503, "unavailable");

        let err = ops.revoke(TokenKind::Access).await.unwrap_err();

        assert_eq!(err, FlowError::Revocation { status: 503, provider_error: None });
        assert_eq!(session.access_token().unwrap(), "at");
    }

    #[tokio::test]
    async fn test_user_info() {
        let (ops, session, transport) = client();
        session.set_access_token("at").unwrap();
        transport.push_json(200, json!({"sub": "u1", "email": "a@example.com"}));

        let info = ops.user_info().await.unwrap();

        assert_eq!(info.email.as_deref(), Some("a@example.com"));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.header("Authorization"), Some("Bearer at"));
    }

    #[tokio::test]
    async fn test_user_info_failure() {
        let (ops, session, transport) = client();
        session.set_access_token("expired").unwrap();
        transport.push_reply(401, "");

        assert_eq!(ops.user_info().await.unwrap_err(), FlowError::UserInfo { status: 401 });
    }
}
