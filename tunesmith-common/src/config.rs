//! Configuration loading and resolution
//!
//! Per-key resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TUNESMITH_*`)
//! 3. TOML config file (`~/.config/tunesmith/config.toml`)
//! 4. Compiled default (optional keys only)
//!
//! Provider credentials have no defaults; a missing one produces a
//! `Config` error naming every way to supply it.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default listen address for the web service
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// Default application root the OAuth callback redirects back to
pub const DEFAULT_APP_URL: &str = "http://127.0.0.1:5730";

/// Raw TOML config file contents; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub app_url: Option<String>,
    pub gemini_api_key: Option<String>,
    pub bind_address: Option<String>,
    pub cookie_secure: Option<bool>,
}

impl TomlConfig {
    /// Load the TOML config file, if one exists.
    ///
    /// An explicit `path` must exist; the default platform path is
    /// optional and its absence yields an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: TomlConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Default platform config path (`~/.config/tunesmith/config.toml` on Linux)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("tunesmith").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("tunesmith.toml"))
}

/// Command-line overrides fed into resolution (highest priority tier)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub bind_address: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// OAuth redirect URI registered with the provider
    pub redirect_uri: String,
    /// Application root the callback redirects browsers back to
    pub app_url: String,
    pub gemini_api_key: String,
    pub bind_address: String,
    /// Set the `Secure` attribute on auth cookies (production deployments)
    pub cookie_secure: bool,
}

impl AppConfig {
    /// Resolve the full configuration from CLI overrides, environment,
    /// and the TOML config file.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = TomlConfig::load(overrides.config_file.as_deref())?;

        let spotify_client_id = resolve_required(
            "spotify_client_id",
            "TUNESMITH_SPOTIFY_CLIENT_ID",
            toml_config.spotify_client_id.clone(),
        )?;
        let spotify_client_secret = resolve_required(
            "spotify_client_secret",
            "TUNESMITH_SPOTIFY_CLIENT_SECRET",
            toml_config.spotify_client_secret.clone(),
        )?;
        let redirect_uri = resolve_required(
            "redirect_uri",
            "TUNESMITH_REDIRECT_URI",
            toml_config.redirect_uri.clone(),
        )?;
        let gemini_api_key = resolve_required(
            "gemini_api_key",
            "TUNESMITH_GEMINI_API_KEY",
            toml_config.gemini_api_key.clone(),
        )?;

        let app_url = resolve_optional("TUNESMITH_APP_URL", toml_config.app_url.clone())
            .unwrap_or_else(|| DEFAULT_APP_URL.to_string());

        let bind_address = overrides
            .bind_address
            .clone()
            .or_else(|| resolve_optional("TUNESMITH_BIND_ADDRESS", toml_config.bind_address.clone()))
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let cookie_secure = match std::env::var("TUNESMITH_COOKIE_SECURE") {
            Ok(v) => parse_bool(&v)?,
            Err(_) => toml_config.cookie_secure.unwrap_or(false),
        };

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            redirect_uri,
            app_url,
            gemini_api_key,
            bind_address,
            cookie_secure,
        })
    }
}

/// Resolve a required key from ENV then TOML, warning when both are set.
fn resolve_required(key: &str, env_var: &str, toml_value: Option<String>) -> Result<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_value(v));
    let toml_value = toml_value.filter(|v| is_valid_value(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both {} and the config file. Using environment (higher priority).",
            key, env_var
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", key);
        return Ok(value);
    }

    if let Some(value) = toml_value {
        info!("{} loaded from config file", key);
        return Ok(value);
    }

    Err(Error::Config(format!(
        "{key} not configured. Please configure using one of:\n\
         1. Environment: {env_var}=your-value-here\n\
         2. TOML config: {} ({key} = \"your-value\")",
        default_config_path().display()
    )))
}

fn resolve_optional(env_var: &str, toml_value: Option<String>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| is_valid_value(v))
        .or_else(|| toml_value.filter(|v| is_valid_value(v)))
}

/// Validate a configured value (non-empty, non-whitespace)
fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(Error::Config(format!(
            "Invalid boolean value: {other} (expected true/false)"
        ))),
    }
}
