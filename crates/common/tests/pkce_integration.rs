//! Integration tests for PKCE and CSRF state generation

use std::collections::HashSet;

use flowlab_common::auth::PkcePair;
use flowlab_common::{generate_code_challenge, generate_code_verifier, generate_state};

/// Validates RFC 7636 Appendix B through the public API.
#[test]
fn test_rfc7636_vector_via_pair() {
    let pair = PkcePair::from_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
    assert_eq!(pair.code_challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

/// Validates that generated verifiers satisfy RFC 7636 length and charset.
#[test]
fn test_generated_verifiers_are_rfc_compliant() {
    for _ in 0..100 {
        let verifier = generate_code_verifier();
        assert!((43..=128).contains(&verifier.len()));
        assert!(verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')));
    }
}

/// Validates that challenges never carry base64 padding or unsafe characters.
#[test]
fn test_challenge_is_unpadded_base64url() {
    for _ in 0..50 {
        let challenge = generate_code_challenge(&generate_code_verifier());
        assert_eq!(challenge.len(), 43);
        assert!(!challenge.contains('='));
        assert!(!challenge.contains('+'));
        assert!(!challenge.contains('/'));
    }
}

#[test]
fn test_state_values_do_not_repeat() {
    let states: HashSet<String> = (0..500).map(|_| generate_state()).collect();
    assert_eq!(states.len(), 500);
}
