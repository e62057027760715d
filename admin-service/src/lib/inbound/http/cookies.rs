//! Credential cookies and token extraction.

use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;
use time::Duration;
use time::OffsetDateTime;

use crate::domain::principal::models::IssuedSession;

/// Cookie carrying the signed access (or session) token.
pub const ACCESS_TOKEN_COOKIE: &str = "X-Access-Token";

/// Cookie carrying the opaque refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "X-Refresh-Token";

const REQUESTED_WITH: &str = "x-requested-with";
const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Attributes shared by every credential cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age: Duration,
}

impl CookiePolicy {
    pub fn new(secure: bool, lifetime: chrono::Duration) -> Self {
        Self {
            secure,
            max_age: Duration::seconds(lifetime.num_seconds()),
        }
    }
}

/// Create a credential cookie.
pub fn credential_cookie(name: &str, value: &str, policy: &CookiePolicy) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(policy.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(policy.max_age)
        .build()
}

/// Create removal cookie for a credential.
pub fn cleared_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Cookies carrying an issued session.
///
/// Without a refresh token (cookie mode) the refresh cookie is cleared.
pub fn session_cookies(session: &IssuedSession, policy: &CookiePolicy) -> Vec<Cookie<'static>> {
    let refresh = match &session.refresh_token {
        Some(refresh) => credential_cookie(REFRESH_TOKEN_COOKIE, &refresh.token, policy),
        None => cleared_cookie(REFRESH_TOKEN_COOKIE),
    };

    vec![
        credential_cookie(ACCESS_TOKEN_COOKIE, &session.access_token, policy),
        refresh,
    ]
}

pub fn with_session_cookies(
    jar: CookieJar,
    session: &IssuedSession,
    policy: &CookiePolicy,
) -> CookieJar {
    session_cookies(session, policy)
        .into_iter()
        .fold(jar, |jar, cookie| jar.add(cookie))
}

pub fn without_session_cookies(jar: CookieJar) -> CookieJar {
    jar.add(cleared_cookie(ACCESS_TOKEN_COOKIE))
        .add(cleared_cookie(REFRESH_TOKEN_COOKIE))
}

/// Token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Access token from the `Authorization` header, falling back to the access cookie.
pub fn access_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    bearer_token(headers)
        .map(str::to_string)
        .or_else(|| cookie_value(jar, ACCESS_TOKEN_COOKIE))
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    cookie_value(jar, REFRESH_TOKEN_COOKIE)
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Whether the request was issued by script rather than by navigation.
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get(REQUESTED_WITH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case(XML_HTTP_REQUEST))
}

/// Whether `headers` already carry a `Set-Cookie` for `name`.
pub fn sets_cookie(headers: &HeaderMap, name: &str) -> bool {
    let prefix = format!("{}=", name);
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(&prefix))
}

/// Append `cookies` to response headers, skipping any the response already sets.
pub fn append_missing_cookies(headers: &mut HeaderMap, cookies: Vec<Cookie<'static>>) {
    for cookie in cookies {
        if sets_cookie(headers, cookie.name()) {
            continue;
        }
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => {
                tracing::error!(cookie = cookie.name(), error = %e, "Unencodable cookie skipped");
            }
        }
    }
}
