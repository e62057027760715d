use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::CallerData;
use crate::inbound::http::context::CurrentPrincipal;

pub async fn validate_session(
    current: CurrentPrincipal,
) -> Result<ApiSuccess<ValidateSessionResponseData>, ApiError> {
    let principal = current
        .current_principal()
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ValidateSessionResponseData {
            message: "Session is valid".to_string(),
            user: principal.into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateSessionResponseData {
    pub message: String,
    pub user: CallerData,
}
