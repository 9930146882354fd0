//! HTTP API handlers for tunesmith-ui

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tunesmith_common::api::types::ErrorBody;
use tunesmith_common::Error;

pub mod auth;
pub mod buildinfo;
pub mod chat;
pub mod cookies;
pub mod guard;
pub mod health;
pub mod playlist;

pub use buildinfo::get_build_info;
pub use guard::{catalog_guard, AccessToken};
pub use health::health_routes;

/// Error taxonomy → HTTP response mapping.
///
/// Handlers return `Result<_, ApiError>` and propagate with `?`; the
/// response body is always an [`ErrorBody`].
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            Error::Auth(detail) => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("Authentication required").with_details(detail),
            ),
            Error::Validation(detail) => (StatusCode::BAD_REQUEST, ErrorBody::new(detail)),
            Error::NotFound(detail) => (StatusCode::NOT_FOUND, ErrorBody::new(detail)),
            Error::TransientProvider(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::new("Provider temporarily unavailable").with_details(detail),
            ),
            Error::PartialFailure { playlist_id, detail } => {
                let mut body = ErrorBody::new("Playlist created but tracks could not be added")
                    .with_details(detail);
                body.playlist_id = Some(playlist_id);
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Internal error").with_details(other.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}
