//! Auth cookie construction
//!
//! The browser's cookie jar is the only credential store: the access
//! cookie expires with the provider-reported token lifetime, the refresh
//! cookie after a fixed 30 days. Both are HTTP-only and SameSite-Lax;
//! `Secure` is set from configuration for production deployments.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tunesmith_common::model::RequestCredentials;

pub const ACCESS_COOKIE: &str = "spotify_access_token";
pub const REFRESH_COOKIE: &str = "spotify_refresh_token";

const REFRESH_MAX_AGE_DAYS: i64 = 30;

/// Access-token cookie; max-age matches the provider-reported expiry.
pub fn access_cookie(token: &str, expires_in_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(expires_in_secs as i64))
        .build()
}

/// Refresh-token cookie; fixed 30-day max-age.
pub fn refresh_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(REFRESH_MAX_AGE_DAYS))
        .build()
}

/// Removal cookie for the access token.
pub fn clear_access_cookie() -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Removal cookie for the refresh token.
pub fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Add both removal cookies to a jar (logout, irrecoverable refresh failure).
pub fn clear_all(jar: CookieJar) -> CookieJar {
    jar.add(clear_access_cookie()).add(clear_refresh_cookie())
}

/// Read the request's credential pair out of the cookie jar.
pub fn credentials_from_jar(jar: &CookieJar) -> RequestCredentials {
    RequestCredentials {
        access_token: cookie_value(jar, ACCESS_COOKIE),
        refresh_token: cookie_value(jar, REFRESH_COOKIE),
    }
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
