//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 verifier and `S256` challenge generation, plus the
//! random `state` values used for CSRF protection on the authorization
//! redirect. All encodings are base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a code verifier (43 encoded characters).
pub const VERIFIER_BYTES: usize = 32;

/// Number of random bytes behind a CSRF state value (43 encoded characters).
pub const STATE_BYTES: usize = 32;

fn random_urlsafe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43 characters).
/// Per RFC 7636, verifiers must be 43-128 characters long.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_urlsafe(VERIFIER_BYTES)
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier))).
/// Deterministic for any input, including the empty string.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Generate a random state token for CSRF protection
#[must_use]
pub fn generate_state() -> String {
    random_urlsafe(STATE_BYTES)
}

/// Verifier/challenge pair for one authorization request
///
/// The verifier stays with the client until the token exchange; only the
/// challenge travels on the authorization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Random string (43 chars, base64url encoded)
    pub code_verifier: String,

    /// SHA256 hash of `code_verifier` (base64url encoded)
    pub code_challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair
    ///
    /// # Examples
    /// ```
    /// use flowlab_common::auth::PkcePair;
    ///
    /// let pair = PkcePair::generate();
    /// assert_eq!(pair.code_verifier.len(), 43);
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        Self::from_verifier(generate_code_verifier())
    }

    /// Build the pair for an existing (possibly user-supplied) verifier
    #[must_use]
    pub fn from_verifier(code_verifier: String) -> Self {
        let code_challenge = generate_code_challenge(&code_verifier);
        Self { code_verifier, code_challenge }
    }
}
