//! Chat endpoint: conversational replies and playlist suggestions

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use tunesmith_common::api::types::{ChatRequest, ChatResponse, ErrorBody, PlaylistSuggestion};

use super::cookies;
use crate::reconcile;
use crate::AppState;

const PLAYLIST_APOLOGY: &str =
    "I encountered an error while creating your playlist. Please try again with a different request.";
const CONVERSATION_APOLOGY: &str =
    "I encountered an error while processing your message. Please try again.";

/// POST /api/ai/chat
///
/// Conversational path returns `{message}`. Playlist path returns
/// `{message, playlistSuggestion}`, with tracks reconciled against the
/// catalog whenever the request carries an access token. Generation
/// failures degrade to an apologetic message rather than an error status.
pub async fn chat(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ChatRequest>,
) -> Response {
    if request.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Message is required")),
        )
            .into_response();
    }

    if request.is_playlist_request {
        playlist_reply(&state, &jar, &request.message).await
    } else {
        conversation_reply(&state, &request.message).await
    }
}

async fn conversation_reply(state: &AppState, message: &str) -> Response {
    match state.gemini.conversation(message).await {
        Ok(reply) => Json(ChatResponse {
            message: reply,
            playlist_suggestion: None,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Conversation generation failed");
            Json(ChatResponse {
                message: CONVERSATION_APOLOGY.to_string(),
                playlist_suggestion: None,
            })
            .into_response()
        }
    }
}

async fn playlist_reply(state: &AppState, jar: &CookieJar, intent: &str) -> Response {
    let generated = match state.gemini.generate_playlist(intent).await {
        Ok(generated) => generated,
        Err(e) => {
            tracing::warn!(error = %e, "Playlist generation failed");
            return Json(ChatResponse {
                message: PLAYLIST_APOLOGY.to_string(),
                playlist_suggestion: None,
            })
            .into_response();
        }
    };

    // With a session token the candidates are verified against the real
    // catalog; without one the suggestion is still worth showing.
    let credentials = cookies::credentials_from_jar(jar);
    let tracks = match credentials.access_token.as_deref() {
        Some(token) => {
            let catalog = state.catalog.as_ref();
            reconcile::reconcile(generated.tracks, move |query| async move {
                catalog
                    .search_tracks(token, &query, 1)
                    .await
                    .map(|results| results.into_iter().next())
            })
            .await
        }
        None => reconcile::skip_reconciliation(generated.tracks),
    };

    let message = format!(
        "Based on your request, I've created a \"{}\" playlist. Would you like me to save this to your Spotify account?",
        generated.name
    );

    Json(ChatResponse {
        message,
        playlist_suggestion: Some(PlaylistSuggestion {
            name: generated.name,
            description: generated.description,
            tracks,
        }),
    })
    .into_response()
}
