//! Suggestion-to-catalog reconciliation pipeline
//!
//! Generated playlists reference plausible-but-nonexistent tracks; trusting
//! them blindly produces unplayable playlists. This pipeline resolves each
//! candidate against the real catalog: a match replaces the candidate's
//! metadata and identifier with the catalog's, a miss (or a failed lookup)
//! carries the candidate through verbatim as an explicit fallback.
//!
//! Lookups run concurrently with bounded parallelism; results are
//! reassembled by input index, so output order always matches input order
//! no matter which lookups finish first. A same-name cover or alternate
//! recording may be substituted for the intended one; reconciliation is
//! best-effort, not exact.

use futures::stream::{self, StreamExt};
use std::future::Future;
use tunesmith_common::model::{CandidateTrack, CatalogTrack, ResolvedTrack};
use tunesmith_common::Result;

/// Concurrent catalog lookups in flight at once
pub const RECONCILE_WORKERS: usize = 4;

/// Resolve each candidate against the catalog via `search`, an
/// authenticated at-most-one-result lookup.
///
/// Guarantees, regardless of per-item latency or failure:
/// - output length equals input length
/// - output order equals input order
/// - a single lookup failure never aborts the batch
pub async fn reconcile<S, Fut>(candidates: Vec<CandidateTrack>, search: S) -> Vec<ResolvedTrack>
where
    S: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<CatalogTrack>>>,
{
    let search = &search;

    let mut tagged: Vec<(usize, ResolvedTrack)> =
        stream::iter(candidates.into_iter().enumerate())
            .map(|(index, candidate)| async move {
                let resolved = resolve_one(candidate, search).await;
                (index, resolved)
            })
            .buffer_unordered(RECONCILE_WORKERS)
            .collect()
            .await;

    // Completion order is arbitrary; the index tag restores input order.
    tagged.sort_unstable_by_key(|(index, _)| *index);
    tagged.into_iter().map(|(_, resolved)| resolved).collect()
}

/// No session context: reconciliation is skipped, not failed. The
/// candidates come back unmodified, tagged as fallbacks, and are still
/// useful to display.
pub fn skip_reconciliation(candidates: Vec<CandidateTrack>) -> Vec<ResolvedTrack> {
    candidates.into_iter().map(ResolvedTrack::fallback).collect()
}

async fn resolve_one<S, Fut>(candidate: CandidateTrack, search: &S) -> ResolvedTrack
where
    S: Fn(String) -> Fut,
    Fut: Future<Output = Result<Option<CatalogTrack>>>,
{
    let query = search_query(&candidate);

    match search(query).await {
        Ok(Some(track)) => {
            tracing::debug!(
                candidate = %candidate.name,
                matched = %track.name,
                uri = %track.uri,
                "Catalog match found"
            );
            ResolvedTrack::verified(track)
        }
        Ok(None) => {
            tracing::debug!(candidate = %candidate.name, "No catalog match; keeping candidate");
            ResolvedTrack::fallback(candidate)
        }
        Err(e) => {
            // Per-item error isolation: log and fall back, never abort.
            tracing::warn!(
                candidate = %candidate.name,
                error = %e,
                "Catalog lookup failed; keeping candidate"
            );
            ResolvedTrack::fallback(candidate)
        }
    }
}

/// Search query: candidate title followed by every artist name.
fn search_query(candidate: &CandidateTrack) -> String {
    let artists = candidate
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if artists.is_empty() {
        candidate.name.clone()
    } else {
        format!("{} {}", candidate.name, artists)
    }
}
