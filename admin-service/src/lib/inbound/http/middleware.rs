use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use super::context::AuthenticatedPrincipal;
use super::cookies;
use super::handlers::ApiError;
use crate::domain::principal::models::RefreshCommand;
use crate::inbound::http::router::AppState;

/// Paths served without authentication.
///
/// Entries ending in `/` match every path below them; other entries match the
/// exact path, or the path followed by `/`. Comparison ignores case.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths(Vec<String>);

impl PublicPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            paths
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.0.iter().any(|entry| {
            if entry == "/" {
                path == "/"
            } else if entry.ends_with('/') {
                path.starts_with(entry.as_str())
            } else {
                path.strip_prefix(entry.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest == "/")
            }
        })
    }
}

/// Middleware that authenticates every non-public request.
///
/// A valid access token (bearer header first, then the access cookie) attaches
/// an [`AuthenticatedPrincipal`]. An invalid or expired one is traded for a new
/// session when a refresh cookie is present; the rotated cookies are appended
/// to the downstream response unless the handler set them itself. Anything
/// else is rejected with 401 for script callers or a redirect to the login
/// page, clearing both credential cookies.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if state.session.public_paths.matches(&path) {
        return next.run(req).await;
    }

    let Some(token) = cookies::access_token(req.headers(), &jar) else {
        tracing::debug!(path = %path, "No credentials presented");
        return reject(&state, jar, req.headers());
    };

    match state
        .authenticator
        .validate_access_token(&token)
        .map_err(|e| e.to_string())
        .and_then(|claims| AuthenticatedPrincipal::from_claims(&claims).map_err(|e| e.to_string()))
    {
        Ok(principal) => {
            req.extensions_mut().insert(principal);
            return next.run(req).await;
        }
        Err(reason) => {
            tracing::debug!(path = %path, reason = %reason, "Access token rejected");
        }
    }

    let Some(refresh_token) = cookies::refresh_token(&jar) else {
        return reject(&state, jar, req.headers());
    };

    let session = match state
        .session_service
        .refresh(RefreshCommand {
            refresh_token,
            access_token: Some(token),
        })
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::info!(path = %path, error = %e, "Silent refresh failed");
            return reject(&state, jar, req.headers());
        }
    };

    match HeaderValue::from_str(&format!("Bearer {}", session.access_token)) {
        Ok(value) => {
            req.headers_mut().insert(header::AUTHORIZATION, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Refreshed access token is not a valid header value");
            return reject(&state, jar, req.headers());
        }
    }
    req.extensions_mut()
        .insert(AuthenticatedPrincipal::from(&session.principal));
    tracing::debug!(path = %path, principal_id = %session.principal.id, "Session refreshed in flight");

    let mut response = next.run(req).await;
    cookies::append_missing_cookies(
        response.headers_mut(),
        cookies::session_cookies(&session, &state.session.cookie_policy),
    );
    response
}

fn reject(state: &AppState, jar: CookieJar, headers: &HeaderMap) -> Response {
    let jar = cookies::without_session_cookies(jar);

    if cookies::is_ajax(headers) {
        (jar, ApiError::Unauthorized("Unauthorized".to_string())).into_response()
    } else {
        (jar, Redirect::to(&state.session.login_path)).into_response()
    }
}
