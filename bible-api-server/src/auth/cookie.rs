//! Session cookie construction and token lookup

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "access_token";

/// Build the session cookie carrying `token`.
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::try_from(ttl).unwrap_or(time::Duration::HOUR);
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// An immediately-expiring replacement for the session cookie.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Session token from the `access_token` cookie, falling back to an
/// `Authorization: Bearer` header for non-browser clients.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_owned());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}
