//! Domain model: credentials, tracks, and playlist drafts
//!
//! All session state is carried in short-lived client-held credentials;
//! nothing here is persisted server-side.

use serde::{Deserialize, Serialize};

/// Credentials found in the caller's cookie jar for one request.
///
/// Access-token expiry is enforced by cookie max-age: an expired access
/// cookie is simply absent by the time the request arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl RequestCredentials {
    /// Neither credential is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Result of the authorization-code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds, as reported by the provider.
    pub expires_in: u64,
}

/// Result of a refresh-grant call.
///
/// `refresh_token` is present only when the provider rotates the refresh
/// credential; the caller must then replace the stored one.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefresh {
    pub access_token: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Artist reference as carried on the wire (`{"name": "..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

impl ArtistRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// AI-proposed track reference, unverified against the real catalog.
///
/// `uri` may be fabricated by the generator and must never be trusted
/// without reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTrack {
    pub name: String,
    pub artists: Vec<ArtistRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Verified track from the real catalog (search result subset).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub name: String,
    pub artists: Vec<ArtistRef>,
    pub uri: String,
}

/// How a resolved track's identifier was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Identifier verified against the real catalog; title and artists
    /// are the catalog's metadata.
    Verified,
    /// Catalog lookup found nothing (or failed); the candidate is carried
    /// through verbatim, fabricated identifier included.
    Fallback,
}

/// Track reference after reconciliation.
///
/// Invariant: a resolved list has the same length and relative order as
/// the candidate list it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub name: String,
    pub artists: Vec<ArtistRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub resolution: Resolution,
}

impl ResolvedTrack {
    /// Carry a candidate through unchanged, tagged as a fallback.
    pub fn fallback(candidate: CandidateTrack) -> Self {
        Self {
            name: candidate.name,
            artists: candidate.artists,
            uri: candidate.uri,
            resolution: Resolution::Fallback,
        }
    }

    /// Build from a verified catalog match. The candidate's own metadata is
    /// discarded in favor of the catalog's.
    pub fn verified(track: CatalogTrack) -> Self {
        Self {
            name: track.name,
            artists: track.artists,
            uri: Some(track.uri),
            resolution: Resolution::Verified,
        }
    }
}

/// Playlist visibility on the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Ephemeral playlist draft; exists only for the duration of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub tracks: Vec<ResolvedTrack>,
}

impl PlaylistDraft {
    /// Build a draft from bare catalog URIs, as the commit endpoint
    /// receives them. The references carry no metadata and stay tagged
    /// unverified; only their URIs matter to the commit.
    pub fn from_uris(
        name: impl Into<String>,
        description: impl Into<String>,
        visibility: Visibility,
        uris: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            visibility,
            tracks: uris
                .into_iter()
                .map(|uri| ResolvedTrack {
                    name: String::new(),
                    artists: Vec::new(),
                    uri: Some(uri),
                    resolution: Resolution::Fallback,
                })
                .collect(),
        }
    }

    /// Insertable catalog URIs in draft order. Tracks without a URI are
    /// skipped; they cannot be inserted.
    pub fn track_uris(&self) -> Vec<String> {
        self.tracks
            .iter()
            .filter_map(|t| t.uri.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: Option<&str>) -> ResolvedTrack {
        ResolvedTrack {
            name: "Song".into(),
            artists: vec![ArtistRef::new("Artist")],
            uri: uri.map(String::from),
            resolution: Resolution::Fallback,
        }
    }

    #[test]
    fn track_uris_skip_missing_and_preserve_order() {
        let draft = PlaylistDraft {
            name: "Focus Mix".into(),
            description: String::new(),
            visibility: Visibility::Private,
            tracks: vec![
                track(Some("spotify:track:aaa")),
                track(None),
                track(Some("spotify:track:bbb")),
            ],
        };
        assert_eq!(
            draft.track_uris(),
            vec!["spotify:track:aaa", "spotify:track:bbb"]
        );
    }

    #[test]
    fn resolution_serializes_lowercase() {
        let json = serde_json::to_string(&Resolution::Verified).unwrap();
        assert_eq!(json, "\"verified\"");
    }

    #[test]
    fn candidate_round_trips_without_uri() {
        let c: CandidateTrack =
            serde_json::from_str(r#"{"name":"Song","artists":[{"name":"A"}]}"#).unwrap();
        assert!(c.uri.is_none());
        let out = serde_json::to_string(&c).unwrap();
        assert!(!out.contains("uri"));
    }
}
