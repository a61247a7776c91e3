//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use flowlab_domain::FlowError;
use flowlab_infra::config;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[provider]
base_url = "https://id.example.com/"
client_id = "harness"
client_secret = "top-secret"
redirect_uri = "http://localhost:8765/callback"

[storage]
session_path = "/tmp/flowlab-integration.json"
"#;

    let mut temp_file = NamedTempFile::with_suffix(".toml").expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.provider.client_id, "harness");
    assert_eq!(config.provider.token_url(), "https://id.example.com/oauth/token");
    assert_eq!(config.storage.session_path, "/tmp/flowlab-integration.json");
    assert!(config.validate().is_ok());
}

#[test]
fn test_loaded_config_can_fail_validation() {
    let json_content = r#"{
        "provider": {
            "base_url": "ftp://id.example.com",
            "client_id": "harness",
            "redirect_uri": "http://localhost:8765/callback"
        }
    }"#;

    let mut temp_file = NamedTempFile::with_suffix(".json").expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("file itself parses");
    assert!(matches!(config.validate(), Err(FlowError::Config(_))));
}

#[test]
fn test_load_config_missing_provider_section() {
    let mut temp_file = NamedTempFile::with_suffix(".toml").expect("Failed to create temp file");
    temp_file.write_all(b"[storage]\nsession_path = \"x.json\"\n").unwrap();

    let result = config::load_from_file(Some(temp_file.path().to_path_buf()));
    assert!(matches!(result, Err(FlowError::Config(_))));
}
