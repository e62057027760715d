use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::CallerData;
use crate::domain::principal::models::ADMIN_ROLE;
use crate::inbound::http::context::CurrentPrincipal;

/// Administration landing, restricted to the admin role.
pub async fn admin(current: CurrentPrincipal) -> Result<ApiSuccess<AdminResponseData>, ApiError> {
    let principal = current
        .current_principal()
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    if !principal.has_role(ADMIN_ROLE) {
        tracing::info!(principal_id = %principal.id, role = %principal.role, "Admin area denied");
        return Err(ApiError::Forbidden("Forbidden".to_string()));
    }

    Ok(ApiSuccess::new(
        StatusCode::OK,
        AdminResponseData {
            message: format!("Welcome, {}", principal.name),
            user: principal.into(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminResponseData {
    pub message: String,
    pub user: CallerData,
}
