use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::principal::models::RefreshCommand;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

/// Rotate the session held in the refresh cookie.
///
/// Any failure answers 401 and clears both credential cookies.
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<SignInResponseData>), (CookieJar, ApiError)> {
    let Some(refresh_token) = cookies::refresh_token(&jar) else {
        return Err(rejected(jar));
    };
    let access_token = cookies::access_token(&headers, &jar);

    match state
        .session_service
        .refresh(RefreshCommand {
            refresh_token,
            access_token,
        })
        .await
    {
        Ok(session) => {
            let jar = cookies::with_session_cookies(jar, &session, &state.session.cookie_policy);
            Ok((
                jar,
                ApiSuccess::new(
                    StatusCode::OK,
                    SignInResponseData::new("Token refreshed", &session),
                ),
            ))
        }
        Err(e) => {
            tracing::info!(error = %e, "Refresh endpoint rejected token");
            Err(rejected(jar))
        }
    }
}

fn rejected(jar: CookieJar) -> (CookieJar, ApiError) {
    (
        cookies::without_session_cookies(jar),
        ApiError::Unauthorized("Invalid or expired refresh token".to_string()),
    )
}
