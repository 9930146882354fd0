//! Shared API request/response types

use crate::model::ResolvedTrack;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat endpoint request body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Free-text user intent
    pub message: String,
    /// When true, the message is treated as a playlist-creation request
    #[serde(default)]
    pub is_playlist_request: bool,
}

/// Playlist suggestion returned from the chat endpoint.
///
/// Tracks have been through the reconciliation pipeline whenever a
/// session token was available; otherwise every track carries the
/// `fallback` resolution tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSuggestion {
    pub name: String,
    pub description: String,
    pub tracks: Vec<ResolvedTrack>,
}

/// Chat endpoint response body: conversational, or playlist-bearing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_suggestion: Option<PlaylistSuggestion>,
}

/// Authentication check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheckResponse {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

impl AuthCheckResponse {
    pub fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            access_token: None,
        }
    }

    pub fn authenticated(access_token: impl Into<String>) -> Self {
        Self {
            is_authenticated: true,
            access_token: Some(access_token.into()),
        }
    }
}

/// Logout response (always succeeds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Playlist creation request body
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaylistRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Catalog track URIs to insert, in playlist order
    #[serde(default)]
    pub tracks: Vec<String>,
}

fn default_public() -> bool {
    true
}

/// Playlist creation response: the raw catalog playlist object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub success: bool,
    pub playlist: Value,
}

/// Error payload for non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Present on partial playlist-commit failures: the shell that was
    /// created before insertion failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            playlist_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_defaults_playlist_flag() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(!req.is_playlist_request);

        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","isPlaylistRequest":true}"#).unwrap();
        assert!(req.is_playlist_request);
    }

    #[test]
    fn create_request_defaults() {
        let req: CreatePlaylistRequest =
            serde_json::from_str(r#"{"name":"Focus Mix"}"#).unwrap();
        assert!(req.is_public);
        assert!(req.tracks.is_empty());
        assert!(req.description.is_none());
    }

    #[test]
    fn check_response_omits_absent_token() {
        let json = serde_json::to_string(&AuthCheckResponse::unauthenticated()).unwrap();
        assert_eq!(json, r#"{"isAuthenticated":false}"#);

        let json = serde_json::to_string(&AuthCheckResponse::authenticated("tok")).unwrap();
        assert!(json.contains("\"accessToken\":\"tok\""));
    }
}
