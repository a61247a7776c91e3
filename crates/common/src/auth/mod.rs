//! PKCE and CSRF primitives for OAuth 2.0 authorization requests
//!
//! # Module Organization
//!
//! - **[`pkce`]**: code verifier generation, S256 challenge derivation and
//!   random `state` values
//!
//! Everything here is pure and stateless; persisting the generated values is
//! the job of the session layer in `flowlab-core`.

pub mod pkce;

pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state, PkcePair};
