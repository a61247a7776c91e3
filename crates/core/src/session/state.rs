//! CSRF `state` parameter lifecycle
//!
//! Two modes: `enabled` (a state value is sent, possibly blank, and must come
//! back byte-for-byte) and `removed` (no state is sent and none may come back).

use flowlab_common::generate_state;
use flowlab_domain::{Result, StateMode};
use tracing::info;

use super::store::SessionStore;

/// Owns the stored state value and its mode
#[derive(Debug, Clone)]
pub struct StateManager {
    session: SessionStore,
}

impl StateManager {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    /// Reuse the stored state or create one
    ///
    /// Returns `""` without touching storage when state is removed.
    pub fn initialize(&self) -> Result<String> {
        if self.is_removed()? {
            return Ok(String::new());
        }

        let current = self.session.state()?;
        if !current.is_empty() {
            return Ok(current);
        }

        self.store_new()
    }

    /// Like [`Self::initialize`] but never writes
    ///
    /// A blank stored state is replaced by an unsaved fresh value.
    pub fn peek(&self) -> Result<String> {
        if self.is_removed()? {
            return Ok(String::new());
        }

        let current = self.session.state()?;
        if current.is_empty() {
            return Ok(generate_state());
        }
        Ok(current)
    }

    /// Always generate a fresh state and re-enable it
    pub fn refresh(&self) -> Result<String> {
        self.store_new()
    }

    /// Drop the state parameter from the flow
    pub fn remove(&self) -> Result<()> {
        self.session.set_state("")?;
        self.session.set_state_mode(StateMode::Removed)?;
        info!("state parameter removed");
        Ok(())
    }

    /// Persist a user-edited value as-is (blank allowed) and re-enable state
    pub fn set_explicit(&self, value: &str) -> Result<()> {
        self.session.set_state(value)?;
        self.session.set_state_mode(StateMode::Enabled)
    }

    pub fn is_removed(&self) -> Result<bool> {
        Ok(self.session.state_mode()? == StateMode::Removed)
    }

    fn store_new(&self) -> Result<String> {
        let state = generate_state();
        self.session.set_state(&state)?;
        self.session.set_state_mode(StateMode::Enabled)?;
        info!(length = state.len(), "generated new state");
        Ok(state)
    }
}
