//! Typed view over the key-value session record
//!
//! Each session field lives under its own key. Absent keys read as the empty
//! string or the enum default; an unparsable enum value reads as the default
//! and is logged. Writes are single-key, last-writer-wins overwrites.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use flowlab_common::storage::{KeyValueStore, StorageError};
use flowlab_domain::constants::{
    KEY_ACCESS_TOKEN, KEY_CLIENT_AUTH_METHOD, KEY_CODE_VERIFIER, KEY_FLOW, KEY_ID_TOKEN,
    KEY_PROMPT, KEY_REFRESH_TOKEN, KEY_STATE, KEY_STATE_MODE, SESSION_KEYS,
};
use flowlab_domain::{
    ClientAuthMethod, FlowError, FlowType, Result, Session, StateMode, TokenKind, TokenResponse,
};
use tracing::{debug, warn};

/// Convert a storage failure into the flow taxonomy
pub(crate) fn storage_error(err: StorageError) -> FlowError {
    FlowError::Storage(err.to_string())
}

/// Session record backed by a [`KeyValueStore`]
///
/// Cloning shares the backing store.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read(&self, key: &str) -> Result<String> {
        Ok(self.store.get(key).map_err(storage_error)?.unwrap_or_default())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.store.set(key, value).map_err(storage_error)
    }

    fn read_enum<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr + Default,
    {
        let raw = self.read(key)?;
        if raw.is_empty() {
            return Ok(T::default());
        }
        Ok(raw.parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unknown persisted value, using default");
            T::default()
        }))
    }

    pub fn access_token(&self) -> Result<String> {
        self.read(KEY_ACCESS_TOKEN)
    }

    pub fn set_access_token(&self, value: &str) -> Result<()> {
        self.write(KEY_ACCESS_TOKEN, value)
    }

    pub fn refresh_token(&self) -> Result<String> {
        self.read(KEY_REFRESH_TOKEN)
    }

    pub fn set_refresh_token(&self, value: &str) -> Result<()> {
        self.write(KEY_REFRESH_TOKEN, value)
    }

    pub fn id_token(&self) -> Result<String> {
        self.read(KEY_ID_TOKEN)
    }

    pub fn set_id_token(&self, value: &str) -> Result<()> {
        self.write(KEY_ID_TOKEN, value)
    }

    pub fn code_verifier(&self) -> Result<String> {
        self.read(KEY_CODE_VERIFIER)
    }

    pub fn set_code_verifier(&self, value: &str) -> Result<()> {
        self.write(KEY_CODE_VERIFIER, value)
    }

    pub fn state(&self) -> Result<String> {
        self.read(KEY_STATE)
    }

    pub fn set_state(&self, value: &str) -> Result<()> {
        self.write(KEY_STATE, value)
    }

    pub fn state_mode(&self) -> Result<StateMode> {
        self.read_enum(KEY_STATE_MODE)
    }

    pub fn set_state_mode(&self, mode: StateMode) -> Result<()> {
        self.write(KEY_STATE_MODE, mode.as_str())
    }

    pub fn flow(&self) -> Result<FlowType> {
        self.read_enum(KEY_FLOW)
    }

    pub fn set_flow(&self, flow: FlowType) -> Result<()> {
        self.write(KEY_FLOW, flow.as_str())
    }

    pub fn prompt(&self) -> Result<String> {
        self.read(KEY_PROMPT)
    }

    pub fn set_prompt(&self, value: &str) -> Result<()> {
        self.write(KEY_PROMPT, value)
    }

    pub fn client_auth_method(&self) -> Result<ClientAuthMethod> {
        self.read_enum(KEY_CLIENT_AUTH_METHOD)
    }

    pub fn set_client_auth_method(&self, method: ClientAuthMethod) -> Result<()> {
        self.write(KEY_CLIENT_AUTH_METHOD, method.as_str())
    }

    /// Stored token of the given kind
    pub fn token(&self, kind: TokenKind) -> Result<String> {
        match kind {
            TokenKind::Access => self.access_token(),
            TokenKind::Refresh => self.refresh_token(),
        }
    }

    /// Blank one token, leaving the others untouched
    pub fn clear_token(&self, kind: TokenKind) -> Result<()> {
        match kind {
            TokenKind::Access => self.set_access_token(""),
            TokenKind::Refresh => self.set_refresh_token(""),
        }
    }

    /// Overwrite all three tokens from a token response
    ///
    /// A field missing from the response blanks the stored value. The store
    /// has no transactions, so when a write fails the fields already written
    /// are put back to their previous values before the error is returned.
    pub fn store_tokens(&self, response: &TokenResponse) -> Result<()> {
        let updates = [
            (KEY_ACCESS_TOKEN, response.access_token.as_deref().unwrap_or_default()),
            (KEY_REFRESH_TOKEN, response.refresh_token.as_deref().unwrap_or_default()),
            (KEY_ID_TOKEN, response.id_token.as_deref().unwrap_or_default()),
        ];
        let previous = updates
            .iter()
            .map(|(key, _)| self.read(key))
            .collect::<Result<Vec<_>>>()?;

        for (written, (key, value)) in updates.iter().enumerate() {
            if let Err(err) = self.write(key, value) {
                self.restore_tokens(&updates[..written], &previous);
                return Err(err);
            }
        }

        debug!(
            access_token = response.access_token.is_some(),
            refresh_token = response.refresh_token.is_some(),
            id_token = response.id_token.is_some(),
            "stored token response"
        );
        Ok(())
    }

    fn restore_tokens(&self, written: &[(&str, &str)], previous: &[String]) {
        for ((key, _), old) in written.iter().zip(previous) {
            if let Err(err) = self.write(key, old) {
                warn!(key, error = %err, "token rollback failed, session holds a partial token set");
            }
        }
    }

    /// Read every field at once
    pub fn snapshot(&self) -> Result<Session> {
        Ok(Session {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
            id_token: self.id_token()?,
            code_verifier: self.code_verifier()?,
            state: self.state()?,
            state_mode: self.state_mode()?,
            flow: self.flow()?,
            prompt: self.prompt()?,
            client_auth_method: self.client_auth_method()?,
        })
    }

    /// Reset the whole record (logout)
    pub fn clear(&self) -> Result<()> {
        self.store.clear().map_err(storage_error)?;
        debug!(keys = SESSION_KEYS.len(), "session cleared");
        Ok(())
    }
}
