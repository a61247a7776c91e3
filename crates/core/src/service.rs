//! Flow service - the single entry point the UI layer talks to
//!
//! Wires the components around one session and one provider. Each network
//! operation is protected by its own in-flight guard: a second call to the
//! same operation while the first is outstanding fails with
//! `FlowError::Busy`. Different operations may overlap.

use std::collections::HashSet;
use std::sync::Arc;

use flowlab_common::generate_code_verifier;
use flowlab_common::storage::KeyValueStore;
use flowlab_domain::{
    ClientAuthMethod, FlowError, FlowType, ProviderConfig, Result, Session, TokenKind,
    TokenResponse, UserInfo,
};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

use crate::authorize::{canonical_prompt, AuthRequest, AuthRequestBuilder};
use crate::callback::{CallbackParams, CallbackValidator, ValidatedCallback};
use crate::jwt;
use crate::ports::ProviderTransport;
use crate::session::{SessionStore, StateManager};
use crate::token::{ExchangeParams, TokenExchangeEngine, TokenOpsClient};

/// Names of guarded operations
pub mod operation {
    pub const EXCHANGE: &str = "exchange";
    pub const REFRESH: &str = "refresh";
    pub const CLIENT_CREDENTIALS: &str = "client_credentials";
    pub const INTROSPECT: &str = "introspect";
    pub const REVOKE: &str = "revoke";
    pub const USERINFO: &str = "userinfo";
}

#[derive(Debug, Default)]
struct InFlight {
    active: Mutex<HashSet<&'static str>>,
}

impl InFlight {
    fn acquire(self: &Arc<Self>, op: &'static str) -> Result<InFlightGuard> {
        if !self.active.lock().insert(op) {
            return Err(FlowError::Busy(op.to_string()));
        }
        Ok(InFlightGuard { owner: Arc::clone(self), op })
    }
}

/// Releases the operation slot on drop, including on error and cancellation
struct InFlightGuard {
    owner: Arc<InFlight>,
    op: &'static str,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.owner.active.lock().remove(self.op);
    }
}

/// OAuth flow service
#[derive(Clone)]
pub struct FlowService {
    session: SessionStore,
    states: StateManager,
    authorize: AuthRequestBuilder,
    callback: CallbackValidator,
    exchange: TokenExchangeEngine,
    ops: TokenOpsClient,
    in_flight: Arc<InFlight>,
}

impl std::fmt::Debug for FlowService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowService").field("exchange", &self.exchange).finish_non_exhaustive()
    }
}

impl FlowService {
    /// Create a new flow service
    pub fn new(
        config: Arc<ProviderConfig>,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ProviderTransport>,
    ) -> Self {
        let session = SessionStore::new(store);
        Self {
            states: StateManager::new(session.clone()),
            authorize: AuthRequestBuilder::new(Arc::clone(&config), session.clone()),
            callback: CallbackValidator::new(Arc::clone(&config), session.clone()),
            exchange: TokenExchangeEngine::new(
                Arc::clone(&config),
                session.clone(),
                Arc::clone(&transport),
            ),
            ops: TokenOpsClient::new(config, session.clone(), transport),
            session,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    #[must_use]
    pub const fn session_store(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn states(&self) -> &StateManager {
        &self.states
    }

    /// Current session snapshot
    pub fn session(&self) -> Result<Session> {
        self.session.snapshot()
    }

    // --- authorization request -------------------------------------------

    pub fn preview_url(&self, request: &AuthRequest) -> Result<String> {
        self.authorize.preview_url(request)
    }

    pub fn commit_and_build_url(&self, request: &AuthRequest) -> Result<String> {
        self.authorize.commit_and_build_url(request)
    }

    pub fn generate_verifier(&self) -> Result<String> {
        self.authorize.generate_verifier()
    }

    /// Request settings seeded from the session
    ///
    /// Reuses (or creates) the state and verifier so a URL built from it
    /// matches what a callback will be validated against.
    pub fn draft_request(&self) -> Result<AuthRequest> {
        let mut verifier = self.session.code_verifier()?;
        if verifier.is_empty() {
            verifier = self.generate_verifier()?;
        }
        Ok(AuthRequest {
            flow: self.session.flow()?,
            state: self.states.initialize()?,
            code_verifier: verifier,
            prompt: self.session.prompt()?,
            ..AuthRequest::default()
        })
    }

    /// Read-only counterpart of [`Self::draft_request`]
    ///
    /// Blank state and verifier are filled in memory only, so the session
    /// is left exactly as it was.
    pub fn peek_request(&self) -> Result<AuthRequest> {
        let mut verifier = self.session.code_verifier()?;
        if verifier.is_empty() {
            verifier = generate_code_verifier();
        }
        Ok(AuthRequest {
            flow: self.session.flow()?,
            state: self.states.peek()?,
            code_verifier: verifier,
            prompt: self.session.prompt()?,
            ..AuthRequest::default()
        })
    }

    pub fn set_flow(&self, flow: FlowType) -> Result<()> {
        self.session.set_flow(flow)
    }

    pub fn set_prompt(&self, prompt: &str) -> Result<()> {
        self.session.set_prompt(prompt)
    }

    /// Store the canonical form of a prompt selection and return it
    pub fn set_prompt_selection<I, S>(&self, selected: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prompt = canonical_prompt(selected);
        self.session.set_prompt(&prompt)?;
        Ok(prompt)
    }

    pub fn set_client_auth_method(&self, method: ClientAuthMethod) -> Result<()> {
        self.session.set_client_auth_method(method)
    }

    // --- callback & grants ------------------------------------------------

    pub fn validate_callback(&self, params: &CallbackParams) -> Result<ValidatedCallback> {
        self.callback.validate(params)
    }

    /// Validate a redirect, then exchange the code with the default params
    pub async fn handle_callback(&self, params: &CallbackParams) -> Result<TokenResponse> {
        let validated = self.callback.validate(params)?;
        self.exchange_code(&validated.default_params).await
    }

    pub fn default_exchange_params(&self, code: &str) -> Result<ExchangeParams> {
        self.exchange.default_exchange_params(code)
    }

    pub async fn exchange_code(&self, params: &ExchangeParams) -> Result<TokenResponse> {
        let _guard = self.in_flight.acquire(operation::EXCHANGE)?;
        self.exchange.exchange_code(params).await
    }

    pub async fn refresh(&self) -> Result<TokenResponse> {
        let _guard = self.in_flight.acquire(operation::REFRESH)?;
        self.exchange.refresh().await
    }

    pub async fn client_credentials(&self) -> Result<TokenResponse> {
        let _guard = self.in_flight.acquire(operation::CLIENT_CREDENTIALS)?;
        self.exchange.client_credentials().await
    }

    // --- token operations ---------------------------------------------------

    pub async fn introspect(&self, kind: TokenKind) -> Result<Value> {
        let _guard = self.in_flight.acquire(operation::INTROSPECT)?;
        self.ops.introspect(kind).await
    }

    pub async fn revoke(&self, kind: TokenKind) -> Result<()> {
        let _guard = self.in_flight.acquire(operation::REVOKE)?;
        self.ops.revoke(kind).await
    }

    pub async fn user_info(&self) -> Result<UserInfo> {
        let _guard = self.in_flight.acquire(operation::USERINFO)?;
        self.ops.user_info().await
    }

    /// Claims of the stored ID token, `None` when there is none
    pub fn decoded_id_token(&self) -> Result<Option<Value>> {
        let id_token = self.session.id_token()?;
        if id_token.is_empty() {
            return Ok(None);
        }
        jwt::decode_claims(&id_token).map(Some)
    }

    /// Wipe the whole session
    pub fn logout(&self) -> Result<()> {
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }
}
