use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use super::ApiSuccess;
use super::MessageData;
use crate::inbound::http::context::CurrentPrincipal;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Sign the caller out.
///
/// Clearing the stored refresh token is best-effort; the credential cookies
/// are cleared regardless. Script callers get JSON, browsers a redirect to the
/// login page.
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentPrincipal,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    if let Some(principal) = current.current_principal() {
        if let Err(e) = state.session_service.logout(&principal.id).await {
            tracing::warn!(principal_id = %principal.id, error = %e, "Failed to clear refresh token");
        }
        tracing::info!(principal_id = %principal.id, "Principal signed out");
    }

    let jar = cookies::without_session_cookies(jar);
    if cookies::is_ajax(&headers) {
        (
            jar,
            ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")),
        )
            .into_response()
    } else {
        (jar, Redirect::to(&state.session.login_path)).into_response()
    }
}
