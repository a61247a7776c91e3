//! ID token inspection
//!
//! Decodes the JWT payload for display. The signature is not verified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flowlab_domain::{FlowError, Result};
use serde_json::Value;

/// Decode the claims segment of a compact JWT
///
/// # Errors
/// `FlowError::InvalidInput` when the token is not three dot-separated
/// segments or the payload is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Result<Value> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(FlowError::InvalidInput(format!(
            "expected a JWT with 3 segments, got {}",
            segments.len()
        )));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| FlowError::InvalidInput(format!("JWT payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FlowError::InvalidInput(format!("JWT payload is not JSON: {e}")))
}
