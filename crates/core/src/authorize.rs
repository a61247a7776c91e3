//! Authorization request construction
//!
//! [`AuthRequestBuilder::preview_url`] is a pure read: it renders the URL the
//! given settings would produce. [`AuthRequestBuilder::commit_and_build_url`]
//! first persists the verifier, flow, state and prompt, then renders the same
//! URL. Display-only code paths use the former.

use std::collections::BTreeSet;
use std::sync::Arc;

use flowlab_common::{generate_code_challenge, generate_code_verifier};
use flowlab_domain::constants::DEFAULT_SCOPE;
use flowlab_domain::{CodeChallengeMethod, FlowType, ProviderConfig, Result};
use tracing::{debug, info};
use url::form_urlencoded;

use crate::session::{SessionStore, StateManager};

/// Settings for one authorization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub flow: FlowType,
    /// Ignored when the stored state mode is `removed`
    pub state: String,
    pub code_verifier: String,
    pub challenge_method: CodeChallengeMethod,
    pub use_pkce: bool,
    /// Space-separated prompt values; blank means no `prompt` parameter
    pub prompt: String,
}

impl Default for AuthRequest {
    fn default() -> Self {
        Self {
            flow: FlowType::Public,
            state: String::new(),
            code_verifier: String::new(),
            challenge_method: CodeChallengeMethod::S256,
            use_pkce: true,
            prompt: String::new(),
        }
    }
}

impl AuthRequest {
    /// The challenge to send, if any
    ///
    /// `plain` sends the verifier verbatim; `omit` sends nothing.
    #[must_use]
    pub fn code_challenge(&self) -> Option<(String, CodeChallengeMethod)> {
        if !self.use_pkce {
            return None;
        }
        match self.challenge_method {
            CodeChallengeMethod::S256 => {
                Some((generate_code_challenge(&self.code_verifier), CodeChallengeMethod::S256))
            }
            CodeChallengeMethod::Plain => {
                Some((self.code_verifier.clone(), CodeChallengeMethod::Plain))
            }
            CodeChallengeMethod::Omit => None,
        }
    }
}

/// Canonical prompt string from a set of selected values
///
/// Values are trimmed, de-duplicated and sorted so the same selection always
/// yields the same string.
pub fn canonical_prompt<I, S>(selected: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let values: BTreeSet<String> = selected
        .into_iter()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    values.into_iter().collect::<Vec<_>>().join(" ")
}

/// Builds provider authorization URLs
#[derive(Debug, Clone)]
pub struct AuthRequestBuilder {
    config: Arc<ProviderConfig>,
    session: SessionStore,
    states: StateManager,
}

impl AuthRequestBuilder {
    pub fn new(config: Arc<ProviderConfig>, session: SessionStore) -> Self {
        let states = StateManager::new(session.clone());
        Self { config, session, states }
    }

    /// Render the URL without persisting anything
    pub fn preview_url(&self, request: &AuthRequest) -> Result<String> {
        let removed = self.states.is_removed()?;
        Ok(self.render(request, removed))
    }

    /// Persist the request settings, then render the URL
    ///
    /// A removed state stays blank in the session whatever the request holds.
    pub fn commit_and_build_url(&self, request: &AuthRequest) -> Result<String> {
        let removed = self.states.is_removed()?;
        if request.code_challenge().is_some() {
            self.session.set_code_verifier(&request.code_verifier)?;
        }
        self.session.set_flow(request.flow)?;
        self.session.set_state(if removed { "" } else { request.state.as_str() })?;
        self.session.set_prompt(&request.prompt)?;

        let url = self.render(request, removed);
        info!(
            flow = %request.flow,
            pkce = request.use_pkce,
            challenge_method = %request.challenge_method,
            prompt = %request.prompt,
            "authorization request committed"
        );
        Ok(url)
    }

    /// Generate and persist a fresh code verifier
    pub fn generate_verifier(&self) -> Result<String> {
        let verifier = generate_code_verifier();
        self.session.set_code_verifier(&verifier)?;
        debug!(length = verifier.len(), "generated code verifier");
        Ok(verifier)
    }

    fn render(&self, request: &AuthRequest, state_removed: bool) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", DEFAULT_SCOPE);

        if let Some((challenge, method)) = request.code_challenge() {
            query
                .append_pair("code_challenge", &challenge)
                .append_pair("code_challenge_method", method.as_str());
        }

        if !state_removed {
            query.append_pair("state", &request.state);
        }

        if !request.prompt.trim().is_empty() {
            query.append_pair("prompt", &request.prompt);
        }

        format!("{}?{}", self.config.authorize_url(), query.finish())
    }
}
