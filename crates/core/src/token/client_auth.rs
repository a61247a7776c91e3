//! Client authentication for token-endpoint calls

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flowlab_domain::{ClientAuthMethod, ProviderConfig, Result};

use crate::ports::{FormParams, Headers};
use crate::session::SessionStore;

/// Credentials for one request
///
/// Exactly one of `headers` and `body` carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientCredentials {
    pub headers: Headers,
    pub body: FormParams,
}

impl ClientCredentials {
    /// Credentials for an explicit method
    #[must_use]
    pub fn for_method(method: ClientAuthMethod, config: &ProviderConfig) -> Self {
        match method {
            ClientAuthMethod::ClientSecretBasic => {
                let raw = format!("{}:{}", config.client_id, config.secret_or_empty());
                let header = format!("Basic {}", STANDARD.encode(raw));
                Self { headers: vec![("Authorization".to_string(), header)], body: Vec::new() }
            }
            ClientAuthMethod::ClientSecretPost => Self {
                headers: Vec::new(),
                body: vec![
                    ("client_id".to_string(), config.client_id.clone()),
                    ("client_secret".to_string(), config.secret_or_empty().to_string()),
                ],
            },
        }
    }
}

/// Picks credentials according to the session's client-auth method
#[derive(Debug, Clone)]
pub struct ClientAuthenticator {
    config: Arc<ProviderConfig>,
    session: SessionStore,
}

impl ClientAuthenticator {
    pub fn new(config: Arc<ProviderConfig>, session: SessionStore) -> Self {
        Self { config, session }
    }

    pub fn credentials(&self) -> Result<ClientCredentials> {
        let method = self.session.client_auth_method()?;
        Ok(ClientCredentials::for_method(method, &self.config))
    }

    pub fn headers(&self) -> Result<Headers> {
        Ok(self.credentials()?.headers)
    }

    pub fn body_params(&self) -> Result<FormParams> {
        Ok(self.credentials()?.body)
    }
}
