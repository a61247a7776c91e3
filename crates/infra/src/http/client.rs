//! reqwest-backed [`ProviderTransport`]

use std::time::Duration;

use async_trait::async_trait;
use flowlab_core::ports::{HttpReply, ProviderTransport};
use flowlab_domain::constants::DEFAULT_USER_AGENT;
use flowlab_domain::{FlowError, HttpSettings, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with timeout support.
///
/// Every request is sent exactly once; failures surface to the caller.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Client configured from application settings.
    pub fn from_settings(settings: &HttpSettings) -> Result<Self> {
        Self::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent(settings.user_agent.clone())
            .build()
    }

    /// Execute the provided request builder once.
    async fn send(&self, builder: RequestBuilder) -> Result<HttpReply> {
        let request = builder.build().map_err(|err| FlowError::from(InfraError::from(err)))?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, %path, error = %err, "HTTP request failed");
            FlowError::from(InfraError::from(err))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| FlowError::from(InfraError::from(err)))?;
        debug!(%method, %path, status, body_len = body.len(), "received HTTP response");

        Ok(HttpReply { status, body })
    }
}

fn with_headers(mut builder: RequestBuilder, headers: &[(String, String)]) -> RequestBuilder {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[async_trait]
impl ProviderTransport for HttpClient {
    async fn post_form(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpReply> {
        let builder = with_headers(self.client.post(url), headers).form(form);
        self.send(builder).await
    }

    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpReply> {
        let builder = with_headers(self.client.get(url), headers);
        self.send(builder).await
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut headers = self.default_headers.unwrap_or_default();
        headers
            .entry(reqwest::header::ACCEPT)
            .or_insert(reqwest::header::HeaderValue::from_static("application/json"));

        let builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .no_proxy()
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .default_headers(headers);

        let client = builder.build().map_err(|err| FlowError::from(InfraError::from(err)))?;

        Ok(HttpClient { client })
    }
}
