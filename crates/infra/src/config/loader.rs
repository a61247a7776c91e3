//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the process environment, if one exists
//! 2. Attempts to load from environment variables
//! 3. If a required variable is missing, falls back to loading from file
//! 4. Probes the working directory and its parents for config files
//! 5. Supports JSON and TOML formats
//!
//! The result is validated before it is returned.
//!
//! ## Environment Variables
//! - `FLOWLAB_BASE_URL`: Provider base URL (required)
//! - `FLOWLAB_CLIENT_ID`: OAuth client id (required)
//! - `FLOWLAB_REDIRECT_URI`: Registered redirect URI (required)
//! - `FLOWLAB_CLIENT_SECRET`: Client secret (optional)
//! - `FLOWLAB_SESSION_PATH`: Session file path (optional)
//! - `FLOWLAB_HTTP_TIMEOUT_SECS`: HTTP timeout in seconds (optional)
//!
//! ## File Locations
//! For the working directory and each of its ancestors, in order:
//! `flowlab.toml`, `flowlab.json`, `config.toml`, `config.json`.

use std::path::{Path, PathBuf};

use flowlab_domain::{AppConfig, FlowError, HttpSettings, ProviderConfig, Result, StorageSettings};

use crate::errors::InfraError;

pub const ENV_BASE_URL: &str = "FLOWLAB_BASE_URL";
pub const ENV_CLIENT_ID: &str = "FLOWLAB_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "FLOWLAB_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "FLOWLAB_REDIRECT_URI";
pub const ENV_SESSION_PATH: &str = "FLOWLAB_SESSION_PATH";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "FLOWLAB_HTTP_TIMEOUT_SECS";

const CONFIG_FILE_NAMES: [&str; 4] = ["flowlab.toml", "flowlab.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `FlowError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<AppConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env file"),
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `FlowError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<AppConfig> {
    let provider = ProviderConfig {
        base_url: env_var(ENV_BASE_URL)?,
        client_id: env_var(ENV_CLIENT_ID)?,
        client_secret: optional_env_var(ENV_CLIENT_SECRET),
        redirect_uri: env_var(ENV_REDIRECT_URI)?,
    };

    let mut storage = StorageSettings::default();
    if let Some(path) = optional_env_var(ENV_SESSION_PATH) {
        storage.session_path = path;
    }

    let mut http = HttpSettings::default();
    if let Some(raw) = optional_env_var(ENV_HTTP_TIMEOUT_SECS) {
        http.timeout_seconds = raw
            .parse::<u64>()
            .map_err(|e| FlowError::Config(format!("Invalid HTTP timeout: {}", e)))?;
    }

    Ok(AppConfig { provider, storage, http })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Format is detected by file extension.
///
/// # Errors
/// Returns `FlowError::Config` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FlowError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FlowError::Config(
                "No configuration: set FLOWLAB_* variables or create flowlab.toml".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FlowError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents).map_err(|e| InfraError::from(e).into()),
        _ => Err(FlowError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the working directory and its ancestors for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_from(&cwd)
}

fn probe_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Get required, non-empty environment variable
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        FlowError::Config(format!("Missing required environment variable: {}", key))
    })
}

fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
