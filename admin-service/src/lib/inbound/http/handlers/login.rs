use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::principal::models::LoginCommand;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<SignInResponseData>), ApiError> {
    let Json(body) = body?;
    let command = LoginCommand::new(body.username_or_email, body.password)?;

    let session = state.session_service.login(command).await?;

    let jar = cookies::with_session_cookies(jar, &session, &state.session.cookie_policy);
    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            SignInResponseData::new("Login successful", &session),
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    #[serde(default)]
    username_or_email: String,
    #[serde(default)]
    password: String,
}
