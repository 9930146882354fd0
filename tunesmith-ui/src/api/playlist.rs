//! Catalog-facing endpoints: playlist commit, playlist detail, profile,
//! and library reads
//!
//! All routes here sit behind the routing guard; the `AccessToken`
//! extractor yields either the request's access cookie or the token the
//! guard just minted.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tunesmith_common::api::types::{CreatePlaylistRequest, CreatePlaylistResponse};
use tunesmith_common::model::{PlaylistDraft, Visibility};

use super::guard::AccessToken;
use super::ApiError;
use crate::commit;
use crate::services::AuthedCatalog;
use crate::AppState;

const LIBRARY_PAGE_SIZE: u8 = 50;

/// POST /api/spotify/playlist/create
///
/// Commits a draft: shell creation plus batch track insertion. A partial
/// failure (shell created, insertion failed) surfaces with the created
/// playlist id so the client can retry insertion.
pub async fn create_playlist(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<Json<CreatePlaylistResponse>, ApiError> {
    let visibility = if request.is_public {
        Visibility::Public
    } else {
        Visibility::Private
    };
    let draft = PlaylistDraft::from_uris(
        request.name,
        request.description.unwrap_or_default(),
        visibility,
        request.tracks,
    );

    let catalog = AuthedCatalog {
        client: &state.catalog,
        access_token: &token,
    };
    let committed = commit::commit(&catalog, &draft).await?;

    Ok(Json(CreatePlaylistResponse {
        success: true,
        playlist: committed.playlist,
    }))
}

/// GET /api/spotify/playlist/{id}
///
/// Raw catalog playlist object, passed through untouched.
pub async fn playlist_detail(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
    Path(playlist_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let playlist = state.catalog.get_playlist(&token, &playlist_id).await?;
    Ok(Json(playlist))
}

/// GET /api/spotify/me
pub async fn me(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
) -> Result<Json<Value>, ApiError> {
    let profile = state.catalog.current_user(&token).await?;
    Ok(Json(json!({
        "id": profile.id,
        "displayName": profile.display_name,
    })))
}

/// GET /api/spotify/library
///
/// Aggregate of the user's playlists, saved tracks, and recently played
/// tracks, fetched concurrently.
pub async fn library(
    State(state): State<AppState>,
    AccessToken(token): AccessToken,
) -> Result<Json<Value>, ApiError> {
    let catalog = &state.catalog;
    let (playlists, saved, recent) = tokio::try_join!(
        catalog.user_playlists(&token, LIBRARY_PAGE_SIZE),
        catalog.saved_tracks(&token, LIBRARY_PAGE_SIZE),
        catalog.recently_played(&token, LIBRARY_PAGE_SIZE),
    )?;

    Ok(Json(json!({
        "playlists": playlists,
        "savedTracks": saved,
        "recentlyPlayed": recent,
    })))
}
