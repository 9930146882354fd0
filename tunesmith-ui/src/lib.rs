//! tunesmith-ui library - AI-assisted playlist curation web service
//!
//! Exposes the JSON API the browser client consumes: OAuth login and
//! session management, chat-driven playlist suggestion with catalog
//! reconciliation, and playlist commit.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tunesmith_common::config::AppConfig;
use tunesmith_common::model::TokenRefresh;
use tunesmith_common::Result;

pub mod api;
pub mod commit;
pub mod reconcile;
pub mod services;
pub mod session;

use services::{GeminiClient, SpotifyAuth, SpotifyClient};

/// Application state shared across HTTP handlers.
///
/// Holds configuration and the three stateless external-service clients;
/// no per-user or per-session data lives here. Credentials ride on each
/// request and never outlive it.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<SpotifyAuth>,
    pub catalog: Arc<SpotifyClient>,
    pub gemini: Arc<GeminiClient>,
}

impl AppState {
    /// Create new application state from resolved configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let auth = SpotifyAuth::new(
            config.spotify_client_id.as_str(),
            config.spotify_client_secret.as_str(),
            config.redirect_uri.as_str(),
        )?;
        let catalog = SpotifyClient::new()?;
        let gemini = GeminiClient::new(config.gemini_api_key.as_str())?;

        Ok(Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            catalog: Arc::new(catalog),
            gemini: Arc::new(gemini),
        })
    }
}

impl session::IdentityProvider for AppState {
    /// Lightweight validity probe: fetch the user's own profile.
    fn probe(&self, access_token: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            self.catalog
                .current_user(access_token)
                .await
                .map(|_profile| ())
        }
    }

    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<TokenRefresh>> + Send {
        async move { self.auth.refresh(refresh_token).await }
    }
}

/// Build application router
///
/// Catalog-facing routes sit behind the routing guard; auth, chat,
/// health, and buildinfo are public (chat degrades gracefully without a
/// session instead of rejecting).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Guarded routes (catalog-facing; require a refresh credential)
    let guarded = Router::new()
        .route("/api/spotify/playlist/create", post(api::playlist::create_playlist))
        .route("/api/spotify/playlist/:id", get(api::playlist::playlist_detail))
        .route("/api/spotify/me", get(api::playlist::me))
        .route("/api/spotify/library", get(api::playlist::library))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::catalog_guard,
        ));

    // Public routes (no guard)
    let public = Router::new()
        .route("/api/auth/login", get(api::auth::login))
        .route("/api/auth/callback", get(api::auth::callback))
        .route("/api/auth/check", get(api::auth::check))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/ai/chat", post(api::chat::chat))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    // Combine routers
    Router::new()
        .merge(guarded)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.app_url))
        .with_state(state)
}

/// CORS for the configured app origin. Credentials (cookies) are in play,
/// so the origin must be exact, never a wildcard.
fn cors_layer(app_url: &str) -> CorsLayer {
    match app_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => CorsLayer::new(),
    }
}
