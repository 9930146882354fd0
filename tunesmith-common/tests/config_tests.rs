//! Tests for configuration resolution
//!
//! Covers:
//! - Missing default config file does not cause termination
//! - Explicit config file path must exist
//! - ENV > TOML priority order
//! - Required provider credentials produce self-documenting errors
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate TUNESMITH_* variables are marked #[serial].

use serial_test::serial;
use std::env;
use std::io::Write;
use tunesmith_common::config::{AppConfig, ConfigOverrides, TomlConfig};
use tunesmith_common::Error;

fn clear_env() {
    for var in [
        "TUNESMITH_SPOTIFY_CLIENT_ID",
        "TUNESMITH_SPOTIFY_CLIENT_SECRET",
        "TUNESMITH_REDIRECT_URI",
        "TUNESMITH_GEMINI_API_KEY",
        "TUNESMITH_APP_URL",
        "TUNESMITH_BIND_ADDRESS",
        "TUNESMITH_COOKIE_SECURE",
    ] {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn explicit_config_path_must_exist() {
    let result = TomlConfig::load(Some(std::path::Path::new(
        "/nonexistent/tunesmith/config.toml",
    )));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn config_file_parses_all_keys() {
    let file = write_config(
        r#"
spotify_client_id = "cid"
spotify_client_secret = "secret"
redirect_uri = "http://127.0.0.1:5730/api/auth/callback"
gemini_api_key = "gkey"
bind_address = "0.0.0.0:8080"
cookie_secure = true
"#,
    );

    let config = TomlConfig::load(Some(file.path())).expect("load config");
    assert_eq!(config.spotify_client_id.as_deref(), Some("cid"));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:8080"));
    assert_eq!(config.cookie_secure, Some(true));
    assert!(config.app_url.is_none());
}

#[test]
fn invalid_toml_is_a_config_error() {
    let file = write_config("spotify_client_id = [not toml");
    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn resolve_from_config_file_alone() {
    clear_env();
    let file = write_config(
        r#"
spotify_client_id = "cid"
spotify_client_secret = "secret"
redirect_uri = "http://127.0.0.1:5730/api/auth/callback"
gemini_api_key = "gkey"
"#,
    );

    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        bind_address: None,
    };
    let config = AppConfig::resolve(&overrides).expect("resolve");

    assert_eq!(config.spotify_client_id, "cid");
    assert_eq!(config.bind_address, tunesmith_common::config::DEFAULT_BIND_ADDRESS);
    assert_eq!(config.app_url, tunesmith_common::config::DEFAULT_APP_URL);
    assert!(!config.cookie_secure);
}

#[test]
#[serial]
fn env_overrides_config_file() {
    clear_env();
    let file = write_config(
        r#"
spotify_client_id = "toml-cid"
spotify_client_secret = "secret"
redirect_uri = "http://127.0.0.1:5730/api/auth/callback"
gemini_api_key = "gkey"
"#,
    );

    env::set_var("TUNESMITH_SPOTIFY_CLIENT_ID", "env-cid");
    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        bind_address: None,
    };
    let config = AppConfig::resolve(&overrides).expect("resolve");
    env::remove_var("TUNESMITH_SPOTIFY_CLIENT_ID");

    assert_eq!(config.spotify_client_id, "env-cid");
}

#[test]
#[serial]
fn cli_bind_address_beats_everything() {
    clear_env();
    let file = write_config(
        r#"
spotify_client_id = "cid"
spotify_client_secret = "secret"
redirect_uri = "http://127.0.0.1:5730/api/auth/callback"
gemini_api_key = "gkey"
bind_address = "0.0.0.0:9999"
"#,
    );

    env::set_var("TUNESMITH_BIND_ADDRESS", "0.0.0.0:8888");
    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        bind_address: Some("127.0.0.1:7777".to_string()),
    };
    let config = AppConfig::resolve(&overrides).expect("resolve");
    env::remove_var("TUNESMITH_BIND_ADDRESS");

    assert_eq!(config.bind_address, "127.0.0.1:7777");
}

#[test]
#[serial]
fn missing_credential_error_names_the_options() {
    clear_env();
    let file = write_config(
        r#"
spotify_client_secret = "secret"
redirect_uri = "http://127.0.0.1:5730/api/auth/callback"
gemini_api_key = "gkey"
"#,
    );

    let overrides = ConfigOverrides {
        config_file: Some(file.path().to_path_buf()),
        bind_address: None,
    };
    let err = AppConfig::resolve(&overrides).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("spotify_client_id"));
    assert!(message.contains("TUNESMITH_SPOTIFY_CLIENT_ID"));
}
