//! Logging bootstrap and command logging helpers

use std::time::Duration;

use flowlab_domain::FlowError;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable selecting the log format (`json` or anything else)
pub const LOG_FORMAT_ENV: &str = "FLOWLAB_LOG_FORMAT";

/// Install the global subscriber
///
/// Filter comes from `RUST_LOG` (default `info`). Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json =
        std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(err) = result {
        warn!(error = %err, "tracing subscriber already installed");
    }
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` must be a stable identifier; never pass user input or secrets.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&'static str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        let error_type = error_type.unwrap_or("other");
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}

/// Convert a `FlowError` into a stable label suitable for logging.
#[inline]
pub const fn error_label(error: &FlowError) -> &'static str {
    match error {
        FlowError::Authorization { .. } => "authorization",
        FlowError::MissingCode => "missing_code",
        FlowError::UnexpectedState { .. } => "unexpected_state",
        FlowError::StateMismatch { .. } => "state_mismatch",
        FlowError::NoRefreshToken => "no_refresh_token",
        FlowError::NoToken(_) => "no_token",
        FlowError::TokenExchange { .. } => "token_exchange",
        FlowError::Refresh { .. } => "refresh",
        FlowError::ClientCredentials { .. } => "client_credentials",
        FlowError::Introspection { .. } => "introspection",
        FlowError::Revocation { .. } => "revocation",
        FlowError::UserInfo { .. } => "userinfo",
        FlowError::Network(_) => "network",
        FlowError::Storage(_) => "storage",
        FlowError::Config(_) => "config",
        FlowError::InvalidInput(_) => "invalid_input",
        FlowError::InvalidResponse(_) => "invalid_response",
        FlowError::Busy(_) => "busy",
    }
}

#[cfg(test)]
mod tests {
    use flowlab_domain::TokenKind;

    use super::*;

    #[test]
    fn test_error_labels_are_stable() {
        assert_eq!(error_label(&FlowError::MissingCode), "missing_code");
        assert_eq!(error_label(&FlowError::NoToken(TokenKind::Refresh)), "no_token");
        assert_eq!(
            error_label(&FlowError::Refresh { status: 400, provider_error: None }),
            "refresh"
        );
    }
}
