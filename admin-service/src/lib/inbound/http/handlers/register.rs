use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::SignInResponseData;
use crate::domain::principal::models::RegisterCommand;
use crate::inbound::http::cookies;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<RegisterRequestBody>, JsonRejection>,
) -> Result<(CookieJar, ApiSuccess<SignInResponseData>), ApiError> {
    let Json(body) = body?;
    let command = body.try_into_command()?;

    let session = state.session_service.register(command).await?;

    let jar = cookies::with_session_cookies(jar, &session, &state.session.cookie_policy);
    Ok((
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            SignInResponseData::new("Registration successful", &session),
        ),
    ))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    password: String,
}

impl RegisterRequestBody {
    fn try_into_command(self) -> Result<RegisterCommand, ApiError> {
        RegisterCommand::new(self.username, self.email, self.full_name, self.password)
            .map_err(ApiError::Validation)
    }
}
