//! Persisted session state and the CSRF state lifecycle

pub mod state;
pub mod store;

pub use state::StateManager;
pub use store::SessionStore;
