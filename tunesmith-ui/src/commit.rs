//! Playlist commit orchestration
//!
//! Creates the playlist shell and inserts the draft's tracks as one
//! logical, best-effort operation. There is no transactional guarantee
//! against the external catalog: when insertion fails after the shell was
//! created, the shell exists and the failure surfaces as `PartialFailure`
//! carrying its id, so the caller can retry insertion instead of creating
//! a duplicate playlist.

use serde_json::Value;
use std::future::Future;
use tunesmith_common::model::PlaylistDraft;
use tunesmith_common::{Error, Result};

/// Catalog write operations the commit needs. Implemented by
/// [`crate::services::AuthedCatalog`]; tests substitute scripted stubs.
pub trait Catalog: Send + Sync {
    /// Resolve the authenticated owner's identity.
    fn owner_id(&self) -> impl Future<Output = Result<String>> + Send;

    /// Create an empty playlist shell; returns the raw playlist object.
    fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        description: &str,
        public: bool,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Insert tracks into the shell as a single batch.
    fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> impl Future<Output = Result<()>> + Send;
}

/// A successfully (or partially; see `PartialFailure`) committed playlist
#[derive(Debug, Clone)]
pub struct CommittedPlaylist {
    pub id: String,
    /// Raw catalog playlist object, passed through to the client
    pub playlist: Value,
}

/// Commit a draft to the catalog.
///
/// Failure kinds: `Validation` (empty name, checked before any network
/// call), `Auth` (owner identity rejected), `PartialFailure` (shell
/// created, insertion failed), or the shell-creation error as-is.
pub async fn commit<C: Catalog>(catalog: &C, draft: &PlaylistDraft) -> Result<CommittedPlaylist> {
    if draft.name.trim().is_empty() {
        return Err(Error::Validation("Playlist name is required".to_string()));
    }

    let owner_id = catalog.owner_id().await?;

    let playlist = catalog
        .create_playlist(
            &owner_id,
            &draft.name,
            &draft.description,
            draft.visibility.is_public(),
        )
        .await?;

    let playlist_id = playlist
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Internal("Playlist response missing id".to_string()))?
        .to_string();

    let uris = draft.track_uris();
    if !uris.is_empty() {
        if let Err(e) = catalog.add_tracks(&playlist_id, &uris).await {
            tracing::warn!(
                playlist_id = %playlist_id,
                tracks = uris.len(),
                error = %e,
                "Playlist shell created but track insertion failed"
            );
            return Err(Error::PartialFailure {
                playlist_id,
                detail: e.to_string(),
            });
        }
    }

    tracing::info!(
        playlist_id = %playlist_id,
        name = %draft.name,
        tracks = uris.len(),
        "Playlist committed"
    );

    Ok(CommittedPlaylist {
        id: playlist_id,
        playlist,
    })
}
