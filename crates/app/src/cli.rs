//! Command-line arguments

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use flowlab_domain::{ClientAuthMethod, CodeChallengeMethod, TokenKind};

/// Interactive OAuth 2.0 / OIDC flow harness
#[derive(Debug, Parser)]
#[command(name = "flowlab")]
#[command(version)]
pub struct Cli {
    /// Configuration file (skips environment lookup)
    #[arg(short, long, global = true, env = "FLOWLAB_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the authorization URL (persists the request unless --preview)
    Url {
        #[command(flatten)]
        request: RequestArgs,

        /// Render only; leave the session untouched
        #[arg(long)]
        preview: bool,
    },

    /// Open a loopback server, print the URL and exchange the returned code
    Login {
        #[command(flatten)]
        request: RequestArgs,

        /// Seconds to wait for the browser redirect
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },

    /// Validate a pasted redirect (URL or query string) and exchange the code
    Callback {
        /// Redirect URL or its query string
        query: String,

        #[command(flatten)]
        overrides: ExchangeOverrides,
    },

    /// Use the stored refresh token
    Refresh,

    /// Run the client-credentials grant
    ClientCredentials,

    /// Introspect a stored token
    Introspect {
        #[arg(value_parser = TokenKind::from_str)]
        kind: TokenKind,
    },

    /// Revoke a stored token
    Revoke {
        #[arg(value_parser = TokenKind::from_str)]
        kind: TokenKind,
    },

    /// Fetch the userinfo document with the access token
    Userinfo,

    /// Show the stored session and ID token claims
    Session,

    /// Manage the CSRF state parameter
    State {
        #[command(subcommand)]
        action: StateAction,
    },

    /// Generate and store a new PKCE code verifier
    Verifier,

    /// Clear the whole session
    Logout,
}

#[derive(Debug, Clone, Subcommand)]
pub enum StateAction {
    /// Reuse the stored state or create one
    Init,
    /// Generate a new state
    Refresh,
    /// Stop sending state
    Remove,
    /// Store an exact value (may be empty)
    Set { value: String },
}

/// Authorization request settings shared by `url` and `login`
#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// Send the client secret on the token exchange
    #[arg(long)]
    pub confidential: bool,

    /// Leave PKCE out of the request
    #[arg(long)]
    pub no_pkce: bool,

    /// Challenge method: S256, plain or omit
    #[arg(long, value_parser = CodeChallengeMethod::from_str)]
    pub method: Option<CodeChallengeMethod>,

    /// Comma-separated prompt values, e.g. login,consent
    #[arg(long, value_delimiter = ',')]
    pub prompt: Option<Vec<String>>,

    /// Use this state value instead of the stored one
    #[arg(long)]
    pub state: Option<String>,

    /// Use this code verifier instead of the stored one
    #[arg(long)]
    pub verifier: Option<String>,

    /// Client authentication for introspection and revocation
    #[arg(long, value_enum)]
    pub client_auth: Option<ClientAuthArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClientAuthArg {
    Basic,
    Post,
}

impl From<ClientAuthArg> for ClientAuthMethod {
    fn from(value: ClientAuthArg) -> Self {
        match value {
            ClientAuthArg::Basic => Self::ClientSecretBasic,
            ClientAuthArg::Post => Self::ClientSecretPost,
        }
    }
}

/// Edits applied to the default token-exchange parameters
#[derive(Debug, Clone, Default, Args)]
pub struct ExchangeOverrides {
    /// Add or replace a parameter (KEY=VALUE)
    #[arg(long = "param", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,

    /// Remove a parameter
    #[arg(long = "drop")]
    pub drops: Vec<String>,

    /// Rename a parameter (FROM=TO)
    #[arg(long = "rename", value_parser = parse_pair)]
    pub renames: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("flowlab").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_login_options() {
        let cli = parse(&[
            "login",
            "--confidential",
            "--method",
            "plain",
            "--prompt",
            "login,consent",
            "--client-auth",
            "post",
        ]);
        let Command::Login { request, timeout } = cli.command else {
            panic!("expected login");
        };
        assert!(request.confidential);
        assert_eq!(request.method, Some(CodeChallengeMethod::Plain));
        assert_eq!(request.prompt, Some(vec!["login".to_string(), "consent".to_string()]));
        assert_eq!(request.client_auth, Some(ClientAuthArg::Post));
        assert_eq!(timeout, 300);
    }

    #[test]
    fn test_parse_token_kind() {
        let cli = parse(&["revoke", "refresh"]);
        assert!(matches!(cli.command, Command::Revoke { kind: TokenKind::Refresh }));
        assert!(Cli::try_parse_from(["flowlab", "introspect", "id"]).is_err());
    }

    #[test]
    fn test_parse_exchange_overrides() {
        let cli = parse(&[
            "callback",
            "?code=abc",
            "--param",
            "audience=api",
            "--drop",
            "code_verifier",
            "--rename",
            "code=authorization_code",
        ]);
        let Command::Callback { query, overrides } = cli.command else {
            panic!("expected callback");
        };
        assert_eq!(query, "?code=abc");
        assert_eq!(overrides.params, vec![("audience".to_string(), "api".to_string())]);
        assert_eq!(overrides.drops, vec!["code_verifier".to_string()]);
        assert_eq!(overrides.renames[0].1, "authorization_code");
    }

    #[test]
    fn test_parse_pair_rejects_missing_separator() {
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=value").is_err());
        assert_eq!(parse_pair("k=").unwrap(), ("k".to_string(), String::new()));
    }

    #[test]
    fn test_parse_state_set_empty() {
        let cli = parse(&["state", "set", ""]);
        assert!(matches!(cli.command, Command::State { action: StateAction::Set { value } } if value.is_empty()));
    }
}
