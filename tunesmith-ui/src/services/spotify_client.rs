//! Spotify Web API client
//!
//! Thin, stateless read/write facade over the music catalog. The access
//! token is an explicit parameter on every call; the client holds no
//! credential state, so one instance serves every request without
//! cross-request interference.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tunesmith_common::model::{ArtistRef, CatalogTrack};
use tunesmith_common::{Error, Result};
use url::Url;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("Tunesmith/", env!("CARGO_PKG_VERSION"));
const CATALOG_TIMEOUT_SECS: u64 = 15;

/// Authenticated user's catalog profile
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<SearchTracks>,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    items: Vec<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    uri: String,
    artists: Vec<ArtistObject>,
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

impl From<TrackObject> for CatalogTrack {
    fn from(track: TrackObject) -> Self {
        CatalogTrack {
            name: track.name,
            artists: track
                .artists
                .into_iter()
                .map(|a| ArtistRef { name: a.name })
                .collect(),
            uri: track.uri,
        }
    }
}

/// Spotify Web API client
pub struct SpotifyClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SpotifyClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(CATALOG_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: SPOTIFY_API_BASE.parse().expect("valid default URL"),
        })
    }

    /// Override the API base URL (tests against a local stub).
    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Fetch the authenticated user's profile.
    ///
    /// Also serves as the Session Guard's lightweight validity probe: a 401
    /// here is a definitive token rejection.
    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile> {
        let response = self
            .http
            .get(self.endpoint("/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "profile fetch").await?;
        response
            .json::<UserProfile>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed profile response: {e}")))
    }

    /// Search the catalog for tracks matching `query`.
    pub async fn search_tracks(
        &self,
        access_token: &str,
        query: &str,
        limit: u8,
    ) -> Result<Vec<CatalogTrack>> {
        let url = format!(
            "{}?q={}&type=track&limit={}",
            self.endpoint("/search"),
            urlencoding::encode(query),
            limit
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "track search").await?;
        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("Malformed search response: {e}")))?;

        Ok(search
            .tracks
            .map(|t| t.items.into_iter().map(CatalogTrack::from).collect())
            .unwrap_or_default())
    }

    /// Create an empty playlist shell owned by `user_id`.
    ///
    /// Returns the raw catalog playlist object; callers extract `id`.
    pub async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<Value> {
        let response = self
            .http
            .post(self.endpoint(&format!("/users/{user_id}/playlists")))
            .bearer_auth(access_token)
            .json(&json!({
                "name": name,
                "description": description,
                "public": public,
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, "playlist creation").await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed playlist response: {e}")))
    }

    /// Insert tracks into a playlist as a single batch call.
    pub async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<()> {
        let response = self
            .http
            .post(self.endpoint(&format!("/playlists/{playlist_id}/tracks")))
            .bearer_auth(access_token)
            .json(&json!({ "uris": uris }))
            .send()
            .await
            .map_err(transport_error)?;

        ensure_success(response, "track insertion").await?;
        Ok(())
    }

    /// Fetch a playlist by id; raw passthrough of the catalog object.
    pub async fn get_playlist(&self, access_token: &str, playlist_id: &str) -> Result<Value> {
        self.get_json(access_token, &format!("/playlists/{playlist_id}"), "playlist fetch")
            .await
    }

    /// The user's own playlists.
    pub async fn user_playlists(&self, access_token: &str, limit: u8) -> Result<Value> {
        self.get_json(access_token, &format!("/me/playlists?limit={limit}"), "playlists fetch")
            .await
    }

    /// The user's saved ("liked") tracks.
    pub async fn saved_tracks(&self, access_token: &str, limit: u8) -> Result<Value> {
        self.get_json(access_token, &format!("/me/tracks?limit={limit}"), "saved tracks fetch")
            .await
    }

    /// The user's recently played tracks.
    pub async fn recently_played(&self, access_token: &str, limit: u8) -> Result<Value> {
        self.get_json(
            access_token,
            &format!("/me/player/recently-played?limit={limit}"),
            "recently played fetch",
        )
        .await
    }

    async fn get_json(
        &self,
        access_token: &str,
        path_and_query: &str,
        operation: &'static str,
    ) -> Result<Value> {
        let response = self
            .http
            .get(self.endpoint(path_and_query))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, operation).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Internal(format!("Malformed {operation} response: {e}")))
    }
}

/// Catalog access bound to one request's access token.
///
/// Implements the commit seam without letting the token leak into any
/// longer-lived state.
pub struct AuthedCatalog<'a> {
    pub client: &'a SpotifyClient,
    pub access_token: &'a str,
}

impl crate::commit::Catalog for AuthedCatalog<'_> {
    fn owner_id(&self) -> impl std::future::Future<Output = Result<String>> + Send {
        async move {
            self.client
                .current_user(self.access_token)
                .await
                .map(|profile| profile.id)
        }
    }

    fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> impl std::future::Future<Output = Result<Value>> + Send {
        async move {
            self.client
                .create_playlist(self.access_token, owner_id, name, description, public)
                .await
        }
    }

    fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        async move {
            self.client
                .add_tracks(self.access_token, playlist_id, uris)
                .await
        }
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::TransientProvider(e.to_string())
}

/// Classify a non-success catalog response into the error taxonomy.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(operation, status = %status, "Catalog request failed");

    let code = status.as_u16();
    Err(match code {
        401 | 403 => Error::Auth(format!("{operation} rejected ({status})")),
        404 => Error::NotFound(format!("{operation}: {body}")),
        429 => Error::TransientProvider(format!("{operation} rate limited")),
        _ if status.is_server_error() => {
            Error::TransientProvider(format!("{operation} failed with status {status}"))
        }
        _ => Error::Internal(format!("{operation} failed ({status}): {body}")),
    })
}
