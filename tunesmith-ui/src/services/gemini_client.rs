//! Gemini generative-AI client
//!
//! Produces candidate playlists and conversational replies from free-text
//! intent. Model output is untrusted: the playlist JSON is extracted from
//! free-form text, parsed tolerantly, and malformed track entries are
//! dropped rather than failing the request. Track URIs coming out of here
//! are unverified until the reconciliation pipeline has seen them.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tunesmith_common::model::{ArtistRef, CandidateTrack};
use tunesmith_common::{Error, Result};
use url::Url;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.0-flash";
const USER_AGENT: &str = concat!("Tunesmith/", env!("CARGO_PKG_VERSION"));
const GENERATION_TIMEOUT_SECS: u64 = 30;

/// Harm categories blocked at medium-and-above threshold
const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// A generated candidate playlist, before reconciliation
#[derive(Debug, Clone)]
pub struct GeneratedPlaylist {
    pub name: String,
    pub description: String,
    pub tracks: Vec<CandidateTrack>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Playlist JSON as requested from the model; every field optional so a
/// partially-wrong reply still parses
#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(rename = "playlistName")]
    name: Option<String>,
    #[serde(rename = "playlistDescription")]
    description: Option<String>,
    #[serde(default)]
    tracks: Vec<Value>,
}

/// Gemini API client
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.parse().expect("valid default URL"),
        })
    }

    /// Override the API base URL (tests against a local stub).
    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    /// Generate a candidate playlist from free-text user intent.
    pub async fn generate_playlist(&self, intent: &str) -> Result<GeneratedPlaylist> {
        let text = self.generate(&playlist_prompt(intent)).await?;

        let block = extract_json_block(&text).ok_or_else(|| {
            Error::Generation("Model reply contained no JSON playlist".to_string())
        })?;

        parse_playlist(block)
    }

    /// Conversational music-assistant reply.
    pub async fn conversation(&self, message: &str) -> Result<String> {
        self.generate(&conversation_prompt(message)).await
    }

    /// One generateContent call; returns the first candidate's text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.as_str().trim_end_matches('/'),
            GEMINI_MODEL,
            self.api_key
        );

        let safety_settings: Vec<Value> = SAFETY_CATEGORIES
            .iter()
            .map(|category| {
                json!({
                    "category": category,
                    "threshold": "BLOCK_MEDIUM_AND_ABOVE",
                })
            })
            .collect();

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.9,
                "topK": 40,
                "maxOutputTokens": 1024,
            },
            "safetySettings": safety_settings,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Generation request rejected");
            return Err(Error::Generation(format!(
                "Generation failed with status {status}: {detail}"
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("Malformed generation response: {e}")))?;

        let text: String = reply
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(Error::Generation("Model returned no text".to_string()));
        }

        Ok(text)
    }
}

fn playlist_prompt(intent: &str) -> String {
    format!(
        r#"You are a music expert who creates personalized playlists based on user requests.

User request: "{intent}"

Based on this request, create a playlist that matches the mood, genre, or theme the user is looking for.

Please provide your response in the following JSON format only, without any additional text:
{{
  "playlistName": "Name of the playlist",
  "playlistDescription": "A brief description of the playlist",
  "tracks": [
    {{
      "name": "Song Title",
      "artists": [{{"name": "Artist Name"}}],
      "uri": "spotify:track:XXXX"
    }}
  ]
}}

For the track URIs, use realistic-looking Spotify track IDs (24 character alphanumeric strings) in the format spotify:track:XXXX.
Include 5 tracks (or the count the user asked for) that would fit well in this playlist."#
    )
}

fn conversation_prompt(message: &str) -> String {
    format!(
        r#"You are a helpful music assistant called "Playlist Curator" that specializes in helping users discover music and create playlists.

When users ask for music recommendations or playlists, suggest they try creating a playlist.

Keep your responses conversational, friendly, and focused on music.

User message: {message}"#
    )
}

/// Extract the JSON object from free-form model text: first `{` through
/// the last `}`. Models wrap JSON in prose and code fences; this strips
/// both without needing a fence-aware parser.
fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse the extracted playlist JSON, dropping malformed track entries.
fn parse_playlist(block: &str) -> Result<GeneratedPlaylist> {
    let raw: RawPlaylist = serde_json::from_str(block)
        .map_err(|e| Error::Generation(format!("Unparseable playlist JSON: {e}")))?;

    let name = raw
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::Generation("Playlist JSON missing a name".to_string()))?;

    let total = raw.tracks.len();
    let tracks: Vec<CandidateTrack> = raw.tracks.into_iter().filter_map(sanitize_track).collect();

    if tracks.len() < total {
        tracing::warn!(
            dropped = total - tracks.len(),
            kept = tracks.len(),
            "Dropped malformed track entries from generated playlist"
        );
    }

    Ok(GeneratedPlaylist {
        name,
        description: raw.description.unwrap_or_default(),
        tracks,
    })
}

/// A usable candidate track needs a non-empty name and at least one
/// named artist; anything else is dropped, never fatal.
fn sanitize_track(value: Value) -> Option<CandidateTrack> {
    let name = value.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let artists: Vec<ArtistRef> = value
        .get("artists")?
        .as_array()?
        .iter()
        .filter_map(|a| a.get("name")?.as_str())
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(ArtistRef::new)
        .collect();

    if artists.is_empty() {
        return None;
    }

    let uri = value
        .get("uri")
        .and_then(Value::as_str)
        .map(String::from)
        .filter(|u| !u.trim().is_empty());

    Some(CandidateTrack {
        name: name.to_string(),
        artists,
        uri,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_block_extraction_strips_prose_and_fences() {
        let text = "Sure! Here is your playlist:\n```json\n{\"playlistName\": \"X\"}\n```\nEnjoy!";
        assert_eq!(extract_json_block(text), Some("{\"playlistName\": \"X\"}"));
        assert_eq!(extract_json_block("no json here"), None);
    }

    #[test]
    fn parse_playlist_keeps_well_formed_tracks() {
        let block = r#"{
            "playlistName": "Night Drive",
            "playlistDescription": "Synthwave for empty highways",
            "tracks": [
                {"name": "Nightcall", "artists": [{"name": "Kavinsky"}], "uri": "spotify:track:0U0ldCRmgCqhVvD6ksG63j"},
                {"name": "Tape Eater", "artists": []},
                {"name": "", "artists": [{"name": "Ghost"}]},
                {"name": "A Real Hero", "artists": [{"name": "College"}, {"name": "Electric Youth"}]}
            ]
        }"#;

        let playlist = parse_playlist(block).unwrap();
        assert_eq!(playlist.name, "Night Drive");
        assert_eq!(playlist.tracks.len(), 2);
        assert_eq!(playlist.tracks[0].name, "Nightcall");
        assert_eq!(playlist.tracks[1].artists.len(), 2);
        assert!(playlist.tracks[1].uri.is_none());
    }

    #[test]
    fn parse_playlist_requires_a_name() {
        let err = parse_playlist(r#"{"tracks": []}"#).unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    #[test]
    fn zero_tracks_is_representable() {
        let playlist = parse_playlist(r#"{"playlistName": "Empty", "tracks": []}"#).unwrap();
        assert!(playlist.tracks.is_empty());
    }

    #[test]
    fn prompts_carry_the_user_text() {
        assert!(playlist_prompt("songs for deadlifting").contains("songs for deadlifting"));
        assert!(conversation_prompt("what is shoegaze?").contains("what is shoegaze?"));
    }
}
