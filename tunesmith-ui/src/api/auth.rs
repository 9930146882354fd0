//! Authentication endpoints: login, OAuth callback, session check, logout

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tunesmith_common::api::types::{AuthCheckResponse, ErrorBody, LogoutResponse};

use super::cookies;
use crate::session::{self, AuthOutcome};
use crate::services::SpotifyAuth;
use crate::AppState;

/// GET /api/auth/login
///
/// Redirects the browser to the provider's authorization page.
pub async fn login(State(state): State<AppState>) -> Redirect {
    let nonce = SpotifyAuth::generate_state();
    let url = state.auth.authorize_url(&nonce);
    Redirect::temporary(&url)
}

/// OAuth callback query: the provider sends `code` on success or `error`
/// when the user denied (or something else went wrong).
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/callback
///
/// Exchanges the authorization code for a credential pair, sets both auth
/// cookies, and redirects to the application root. Failures redirect with
/// an `error` query parameter instead of rendering anything here.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(%error, "Authorization denied by provider");
        return error_redirect(&state, &error).into_response();
    }

    let Some(code) = params.code else {
        return error_redirect(&state, "missing_code").into_response();
    };

    match state.auth.exchange_code(&code).await {
        Ok(grant) => {
            tracing::info!("Authorization code exchanged; session established");
            let jar = jar
                .add(cookies::access_cookie(
                    &grant.access_token,
                    grant.expires_in,
                    state.config.cookie_secure,
                ))
                .add(cookies::refresh_cookie(
                    &grant.refresh_token,
                    state.config.cookie_secure,
                ));
            (jar, Redirect::temporary(&state.config.app_url)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Token exchange failed");
            error_redirect(&state, "token_exchange_failed").into_response()
        }
    }
}

fn error_redirect(state: &AppState, code: &str) -> Redirect {
    let url = format!(
        "{}?error={}",
        state.config.app_url,
        urlencoding::encode(code)
    );
    Redirect::temporary(&url)
}

/// GET /api/auth/check
///
/// Runs the full session-guard decision. On a silent refresh the new
/// access cookie (and rotated refresh cookie, when the provider sent one)
/// is set on this response. On an expired session both cookies are
/// cleared. Transient provider failures are 503, never a logout.
pub async fn check(State(state): State<AppState>, jar: CookieJar) -> Response {
    let credentials = cookies::credentials_from_jar(&jar);

    match session::authenticate(&state, &credentials).await {
        Ok(AuthOutcome::Authenticated { access_token }) => {
            Json(AuthCheckResponse::authenticated(access_token)).into_response()
        }
        Ok(AuthOutcome::Refreshed {
            access_token,
            expires_in,
            refresh_token,
        }) => {
            let mut jar = jar.add(cookies::access_cookie(
                &access_token,
                expires_in,
                state.config.cookie_secure,
            ));
            if let Some(rotated) = &refresh_token {
                jar = jar.add(cookies::refresh_cookie(rotated, state.config.cookie_secure));
            }
            (jar, Json(AuthCheckResponse::authenticated(access_token))).into_response()
        }
        Ok(AuthOutcome::Unauthenticated) => {
            let jar = cookies::clear_all(jar);
            (jar, Json(AuthCheckResponse::unauthenticated())).into_response()
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new("Provider temporarily unavailable").with_details(e.to_string())),
        )
            .into_response(),
    }
}

/// POST /api/auth/logout
///
/// Clears both auth cookies unconditionally; always succeeds.
pub async fn logout(jar: CookieJar) -> Response {
    let jar = cookies::clear_all(jar);
    (jar, Json(LogoutResponse { success: true })).into_response()
}
