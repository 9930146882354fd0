//! tunesmith-ui - AI-assisted playlist curation web service
//!
//! Authenticates browser sessions against Spotify via OAuth2, generates
//! playlist suggestions with Gemini, reconciles them against the real
//! catalog, and commits playlists back to the user's account.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tunesmith_common::config::{AppConfig, ConfigOverrides};
use tunesmith_ui::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "tunesmith-ui", version, about = "AI-assisted playlist curation service")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "TUNESMITH_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address (host:port); overrides env and config file
    #[arg(long)]
    bind_address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Tunesmith UI (tunesmith-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let overrides = ConfigOverrides {
        config_file: args.config,
        bind_address: args.bind_address,
    };
    let config = AppConfig::resolve(&overrides)?;

    info!("OAuth redirect URI: {}", config.redirect_uri);
    info!("App root: {}", config.app_url);

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("tunesmith-ui listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
