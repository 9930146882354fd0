//! Spotify accounts service client
//!
//! Performs the OAuth2 authorization-code exchange and the refresh-grant
//! exchange. Stateless: credentials go in as parameters and come back as
//! values; nothing is cached between calls.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::Duration;
use tunesmith_common::model::{TokenGrant, TokenRefresh};
use tunesmith_common::{Error, Result};
use url::Url;

const ACCOUNTS_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
const ACCOUNTS_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = concat!("Tunesmith/", env!("CARGO_PKG_VERSION"));
const TOKEN_TIMEOUT_SECS: u64 = 10;

/// OAuth2 scopes requested at login
const SCOPES: &[&str] = &[
    "streaming",
    "user-read-email",
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-library-read",
    "playlist-read-private",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-recently-played",
];

/// OAuth2 authorization client for the Spotify accounts service
pub struct SpotifyAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    authorize_url: Url,
    token_url: Url,
    http: reqwest::Client,
}

impl SpotifyAuth {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(TOKEN_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            authorize_url: ACCOUNTS_AUTHORIZE_URL.parse().expect("valid default URL"),
            token_url: ACCOUNTS_TOKEN_URL.parse().expect("valid default URL"),
            http,
        })
    }

    /// Override the authorization endpoint (tests against a local provider).
    #[must_use]
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    /// Override the token endpoint (tests against a local provider).
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Generate an authorization URL carrying the given `state` nonce.
    #[must_use]
    pub fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", state);
        url.into()
    }

    /// Random URL-safe state nonce for the authorization request.
    #[must_use]
    pub fn generate_state() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect()
    }

    /// Exchange an authorization code for a credential pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "token exchange").await?;
        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed token response: {e}")))
    }

    /// Mint a new access credential from a refresh credential.
    ///
    /// The response may carry a rotated refresh token; callers must persist
    /// it when present, or the old one stops working on some providers.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenRefresh> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "refresh grant").await?;
        response
            .json::<TokenRefresh>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed refresh response: {e}")))
    }
}

/// Map a transport-level failure (connect, timeout, DNS) to the taxonomy.
/// These never indicate bad credentials.
fn transport_error(e: reqwest::Error) -> Error {
    Error::TransientProvider(e.to_string())
}

/// Check the token-endpoint response status and classify failures.
///
/// Rate limiting and 5xx are retryable; any other rejection of a token
/// grant is definitive (bad code, revoked refresh token, bad client).
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(operation, status = %status, "Token endpoint rejected request");

    if status.as_u16() == 429 || status.is_server_error() {
        Err(Error::TransientProvider(format!(
            "{operation} failed with status {status}"
        )))
    } else {
        Err(Error::Auth(format!(
            "{operation} rejected ({status}): {body}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth() -> SpotifyAuth {
        SpotifyAuth::new("test-client", "test-secret", "http://127.0.0.1:5730/api/auth/callback")
            .unwrap()
    }

    #[test]
    fn authorize_url_carries_required_params() {
        let auth = test_auth();
        let url = auth.authorize_url("nonce123");

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("state=nonce123"));
        assert!(url.contains("playlist-modify-private"));
    }

    #[test]
    fn state_nonce_is_unique_per_call() {
        let a = SpotifyAuth::generate_state();
        let b = SpotifyAuth::generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn endpoint_overrides_apply() {
        let auth = test_auth()
            .with_authorize_url("http://localhost:9000/authorize".parse().unwrap());
        let url = auth.authorize_url("s");
        assert!(url.starts_with("http://localhost:9000/authorize?"));
    }
}
