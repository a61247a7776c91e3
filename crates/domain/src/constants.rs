//! Application constants
//!
//! Storage keys, provider endpoint paths and protocol literals shared by
//! every layer.

// Persisted session keys (one per session field)
pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const KEY_ID_TOKEN: &str = "idToken";
pub const KEY_CODE_VERIFIER: &str = "codeVerifier";
pub const KEY_STATE: &str = "state";
pub const KEY_STATE_MODE: &str = "stateMode";
pub const KEY_FLOW: &str = "flow";
pub const KEY_PROMPT: &str = "prompt";
pub const KEY_CLIENT_AUTH_METHOD: &str = "clientAuthMethod";

/// Every key owned by the session, in field order
pub const SESSION_KEYS: [&str; 9] = [
    KEY_ACCESS_TOKEN,
    KEY_REFRESH_TOKEN,
    KEY_ID_TOKEN,
    KEY_CODE_VERIFIER,
    KEY_STATE,
    KEY_STATE_MODE,
    KEY_FLOW,
    KEY_PROMPT,
    KEY_CLIENT_AUTH_METHOD,
];

// Provider endpoint paths (relative to the configured base URL)
pub const AUTHORIZE_PATH: &str = "/oauth/authorize";
pub const TOKEN_PATH: &str = "/oauth/token";
pub const INTROSPECTION_PATH: &str = "/oauth/token_info";
pub const REVOCATION_PATH: &str = "/oauth/token/revoke";
pub const USERINFO_PATH: &str = "/oauth/userinfo";

/// Fixed scope requested by the authorization and client-credentials grants
pub const DEFAULT_SCOPE: &str = "email profile";

// Grant types
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";
pub const GRANT_CLIENT_CREDENTIALS: &str = "client_credentials";

/// Prompt values offered as toggles; custom values are accepted too
pub const KNOWN_PROMPT_VALUES: [&str; 4] = ["none", "login", "consent", "select_account"];

// Configuration defaults
pub const DEFAULT_SESSION_PATH: &str = ".flowlab/session.json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("flowlab/", env!("CARGO_PKG_VERSION"));
