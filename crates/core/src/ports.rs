//! Port interfaces for provider HTTP access
//!
//! The core never performs I/O itself. Every call to the identity provider
//! goes through [`ProviderTransport`], implemented in infra on top of an HTTP
//! client and in tests by `MockTransport`.

use async_trait::async_trait;
use flowlab_domain::Result;

/// Ordered header list
pub type Headers = Vec<(String, String)>;

/// Ordered `application/x-www-form-urlencoded` fields
pub type FormParams = Vec<(String, String)>;

/// Raw provider reply
///
/// Non-2xx statuses are not transport errors; the caller decides what a
/// status means for its operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Trait for sending requests to the identity provider
#[async_trait]
pub trait ProviderTransport: Send + Sync {
    /// POST a form-encoded body
    ///
    /// Fails only with `FlowError::Network` (or `InvalidInput` for an
    /// unusable URL).
    async fn post_form(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpReply>;

    /// GET with the given headers
    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpReply>;
}
