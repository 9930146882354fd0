//! Routing guard for catalog-facing endpoints
//!
//! Applied as middleware in front of every `/api/spotify/*` route:
//! - no refresh credential → 401 before the handler runs
//! - access credential present → pass through (the handler's catalog call
//!   is itself the validity check; a needless probe per request would
//!   double the provider traffic)
//! - access credential missing → transparent refresh, new access cookie on
//!   the response, token injected for the handler
//! - definitive refresh rejection → 401 with both cookies cleared
//! - transient provider failure → 503, cookies untouched

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, extract::FromRequestParts, Json};
use axum_extra::extract::CookieJar;
use tunesmith_common::api::types::ErrorBody;

use super::cookies;
use crate::AppState;

/// Access token available to a handler, either straight from the access
/// cookie or minted by the guard's transparent refresh.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts.extensions.get::<AccessToken>() {
            return Ok(token.clone());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(cookies::ACCESS_COOKIE)
            .map(|c| AccessToken(c.value().to_string()))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Not authenticated")),
            ))
    }
}

/// Guard middleware for catalog-facing routes.
pub async fn catalog_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let credentials = cookies::credentials_from_jar(&jar);

    let Some(refresh_token) = credentials.refresh_token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody::new("Authentication required")),
        )
            .into_response();
    };

    if let Some(access_token) = credentials.access_token {
        request.extensions_mut().insert(AccessToken(access_token));
        return next.run(request).await;
    }

    // Access cookie expired away; mint a new one before the handler runs.
    match state.auth.refresh(&refresh_token).await {
        Ok(tokens) => {
            tracing::info!("Guard refreshed access credential");
            request
                .extensions_mut()
                .insert(AccessToken(tokens.access_token.clone()));

            let mut jar = jar.add(cookies::access_cookie(
                &tokens.access_token,
                tokens.expires_in,
                state.config.cookie_secure,
            ));
            if let Some(rotated) = &tokens.refresh_token {
                jar = jar.add(cookies::refresh_cookie(rotated, state.config.cookie_secure));
            }

            let response = next.run(request).await;
            (jar, response).into_response()
        }
        Err(e) if e.is_retryable() => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new("Provider temporarily unavailable").with_details(e.to_string())),
        )
            .into_response(),
        Err(e) => {
            tracing::info!(error = %e, "Guard refresh rejected; clearing session");
            let jar = cookies::clear_all(jar);
            (
                jar,
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorBody::new("Failed to refresh token")),
                ),
            )
                .into_response()
        }
    }
}
