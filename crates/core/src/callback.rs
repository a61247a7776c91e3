//! Authorization response validation
//!
//! Checks run in a fixed order: provider error, missing code, then the state
//! rule for the current mode. A validated callback carries the default
//! exchange parameters, which the caller may edit before exchanging.

use std::sync::Arc;

use flowlab_domain::{FlowError, ProviderConfig, Result, StateMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use crate::session::SessionStore;
use crate::token::exchange::{default_exchange_params, ExchangeParams};

/// Query parameters of the provider redirect
///
/// `None` means the parameter was absent; `Some("")` means present but empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string (with or without the leading `?`)
    ///
    /// The first occurrence of a repeated key wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Parse either a full redirect URL or a bare query string
    ///
    /// # Errors
    /// `FlowError::InvalidInput` when the input looks like a URL but does not
    /// parse as one.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.contains("://") {
            let url = Url::parse(input)
                .map_err(|e| FlowError::InvalidInput(format!("invalid callback URL: {e}")))?;
            return Ok(Self::from_query(url.query().unwrap_or_default()));
        }
        Ok(Self::from_query(input))
    }
}

/// Outcome of a successful validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCallback {
    pub code: String,
    pub default_params: ExchangeParams,
}

/// Validates redirects against the stored state and mode
#[derive(Debug, Clone)]
pub struct CallbackValidator {
    config: Arc<ProviderConfig>,
    session: SessionStore,
}

impl CallbackValidator {
    pub fn new(config: Arc<ProviderConfig>, session: SessionStore) -> Self {
        Self { config, session }
    }

    /// Validate a redirect
    ///
    /// # Errors
    /// - `Authorization` when the provider reported an error
    /// - `MissingCode` when no (or an empty) code came back
    /// - `UnexpectedState` when state was removed but the redirect carries one
    /// - `StateMismatch` when state is enabled and the values differ
    pub fn validate(&self, params: &CallbackParams) -> Result<ValidatedCallback> {
        if let Some(error) = &params.error {
            warn!(error = %error, "provider returned an authorization error");
            return Err(FlowError::Authorization {
                error: error.clone(),
                description: params.error_description.clone(),
            });
        }

        let code = match params.code.as_deref() {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => return Err(FlowError::MissingCode),
        };

        match self.session.state_mode()? {
            StateMode::Removed => {
                if let Some(received) = &params.state {
                    return Err(FlowError::UnexpectedState { received: received.clone() });
                }
            }
            StateMode::Enabled => {
                let expected = self.session.state()?;
                if params.state.as_deref() != Some(expected.as_str()) {
                    return Err(FlowError::StateMismatch {
                        received: params.state.clone(),
                        expected,
                    });
                }
            }
        }

        let default_params = default_exchange_params(&self.config, &self.session, &code)?;
        debug!("callback validated");
        Ok(ValidatedCallback { code, default_params })
    }
}
