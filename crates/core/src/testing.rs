//! Test doubles for core ports
//!
//! [`MockTransport`] records every request and answers from a queue of canned
//! replies, so services can be exercised without a provider.

#![allow(clippy::missing_panics_doc)]

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use flowlab_domain::{FlowError, Result};
use parking_lot::Mutex;
use serde_json::Value;

use crate::ports::{HttpReply, ProviderTransport};

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// Scripted [`ProviderTransport`]
///
/// Replies are consumed in FIFO order. An empty queue yields a network error.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpReply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep before answering each request
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_reply(&self, status: u16, body: impl Into<String>) {
        self.replies.lock().push_back(Ok(HttpReply::new(status, body)));
    }

    pub fn push_json(&self, status: u16, body: Value) {
        self.push_reply(status, body.to_string());
    }

    pub fn push_error(&self, error: FlowError) {
        self.replies.lock().push_back(Err(error));
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    async fn answer(&self, request: RecordedRequest) -> Result<HttpReply> {
        self.requests.lock().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(FlowError::Network("no scripted reply".to_string())))
    }
}

#[async_trait]
impl ProviderTransport for MockTransport {
    async fn post_form(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpReply> {
        self.answer(RecordedRequest {
            method: "POST",
            url: url.to_string(),
            headers: headers.to_vec(),
            form: form.to_vec(),
        })
        .await
    }

    async fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpReply> {
        self.answer(RecordedRequest {
            method: "GET",
            url: url.to_string(),
            headers: headers.to_vec(),
            form: Vec::new(),
        })
        .await
    }
}
