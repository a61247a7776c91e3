//! Integration tests for the flow engine
//!
//! One test per protocol property the harness guarantees, driven through the
//! public [`FlowService`] API with an in-memory store and a scripted
//! transport.

use std::sync::Arc;

use flowlab_common::{generate_code_challenge, MemoryStore};
use flowlab_core::testing::MockTransport;
use flowlab_core::{AuthRequest, CallbackParams, FlowService};
use flowlab_domain::{
    CodeChallengeMethod, FlowError, FlowType, ProviderConfig, TokenKind,
};
use serde_json::json;

const RFC_VERIFIER: &str = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
const RFC_CHALLENGE: &str = "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM";

fn setup() -> (FlowService, Arc<MockTransport>) {
    let config = Arc::new(
        ProviderConfig::new("https://auth.example.org", "harness", "http://localhost:3000/callback")
            .with_client_secret("top-secret"),
    );
    let transport = Arc::new(MockTransport::new());
    let service = FlowService::new(config, Arc::new(MemoryStore::new()), transport.clone());
    (service, transport)
}

fn query_pairs(url: &str) -> Vec<(String, String)> {
    let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}

fn query_value(url: &str, key: &str) -> Option<String> {
    query_pairs(url).into_iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Validates challenge determinism and the RFC 7636 vector scenario.
#[test]
fn test_challenge_round_trip_determinism() {
    assert_eq!(generate_code_challenge(RFC_VERIFIER), RFC_CHALLENGE);
    assert_eq!(generate_code_challenge(""), generate_code_challenge(""));
    assert_eq!(generate_code_challenge(""), "47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU");
}

/// Validates state mode exclusivity scenario.
#[test]
fn test_state_mode_exclusivity() {
    let (service, _) = setup();

    service.states().remove().unwrap();
    assert!(service.states().is_removed().unwrap());
    let request = AuthRequest { state: "ignored".into(), ..service.draft_request().unwrap() };
    let url = service.commit_and_build_url(&request).unwrap();
    assert!(!url.contains("state="));

    let fresh = service.states().refresh().unwrap();
    assert!(!service.states().is_removed().unwrap());
    let request = AuthRequest { state: fresh.clone(), ..service.draft_request().unwrap() };
    let url = service.commit_and_build_url(&request).unwrap();
    assert_eq!(query_value(&url, "state"), Some(fresh));
}

/// Validates the callback validation matrix scenario.
#[test]
fn test_callback_validation_matrix() {
    let (service, _) = setup();

    service.states().remove().unwrap();
    assert!(service.validate_callback(&CallbackParams::from_query("code=c")).is_ok());
    for query in ["code=c&state=", "code=c&state=abc"] {
        assert!(matches!(
            service.validate_callback(&CallbackParams::from_query(query)),
            Err(FlowError::UnexpectedState { .. })
        ));
    }

    service.states().set_explicit("abc").unwrap();
    assert!(service.validate_callback(&CallbackParams::from_query("code=c&state=abc")).is_ok());
    for query in ["code=c&state=abcd", "code=c"] {
        assert!(matches!(
            service.validate_callback(&CallbackParams::from_query(query)),
            Err(FlowError::StateMismatch { .. })
        ));
    }
}

/// Validates PKCE omission and plain method scenario.
#[test]
fn test_pkce_omission_and_plain() {
    let (service, _) = setup();
    let base = AuthRequest { code_verifier: RFC_VERIFIER.into(), ..AuthRequest::default() };

    let omit = AuthRequest { challenge_method: CodeChallengeMethod::Omit, ..base.clone() };
    let url = service.preview_url(&omit).unwrap();
    assert_eq!(query_value(&url, "code_challenge"), None);
    assert_eq!(query_value(&url, "code_challenge_method"), None);

    let plain = AuthRequest { challenge_method: CodeChallengeMethod::Plain, ..base };
    let url = service.preview_url(&plain).unwrap();
    assert_eq!(query_value(&url, "code_challenge").as_deref(), Some(RFC_VERIFIER));
    assert_eq!(query_value(&url, "code_challenge_method").as_deref(), Some("plain"));
}

/// Validates confidential vs public exchange parameter shape.
#[test]
fn test_confidential_vs_public_params() {
    let (service, _) = setup();

    service.set_flow(FlowType::Public).unwrap();
    let public = service.default_exchange_params("code").unwrap();
    assert!(!public.contains("client_secret"));

    service.set_flow(FlowType::Confidential).unwrap();
    let confidential = service.default_exchange_params("code").unwrap();
    assert_eq!(confidential.get("client_secret"), Some("top-secret"));
}

/// Validates the revoke-on-failure invariant.
#[tokio::test]
async fn test_revoke_on_failure_invariant() {
    let (service, transport) = setup();
    let store = service.session_store();
    store.set_access_token("access-1").unwrap();
    store.set_refresh_token("refresh-1").unwrap();

    transport.push_json(400, json!({"error": "unsupported_token_type"}));
    assert!(service.revoke(TokenKind::Access).await.is_err());
    assert_eq!(store.access_token().unwrap(), "access-1");

    transport.push_reply(200, "{}");
    service.revoke(TokenKind::Access).await.unwrap();
    assert_eq!(store.access_token().unwrap(), "");
    assert_eq!(store.refresh_token().unwrap(), "refresh-1");
}

/// Validates the end-to-end authorization scenario.
#[tokio::test]
async fn test_end_to_end_scenario() {
    let (service, transport) = setup();
    let request = AuthRequest {
        flow: FlowType::Public,
        state: "xyz".into(),
        code_verifier: RFC_VERIFIER.into(),
        challenge_method: CodeChallengeMethod::S256,
        use_pkce: true,
        prompt: "login consent".into(),
    };

    let url = service.commit_and_build_url(&request).unwrap();

    assert!(url.starts_with("https://auth.example.org/oauth/authorize?"));
    for fragment in [
        "response_type=code",
        "scope=email+profile",
        "code_challenge_method=S256",
        "state=xyz",
        "prompt=login+consent",
    ] {
        assert!(url.contains(fragment), "{fragment} missing from {url}");
    }
    assert_eq!(query_value(&url, "code_challenge").as_deref(), Some(RFC_CHALLENGE));

    transport.push_json(
        200,
        json!({"access_token": "at", "refresh_token": "rt", "id_token": "it", "token_type": "Bearer"}),
    );
    let redirect = "http://localhost:3000/callback?code=auth-code&state=xyz";
    service.handle_callback(&CallbackParams::parse(redirect).unwrap()).await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.form_value("grant_type"), Some("authorization_code"));
    assert_eq!(sent.form_value("code_verifier"), Some(RFC_VERIFIER));
    assert_eq!(sent.form_value("client_secret"), None);

    let session = service.session().unwrap();
    assert_eq!((session.access_token.as_str(), session.refresh_token.as_str()), ("at", "rt"));
}
