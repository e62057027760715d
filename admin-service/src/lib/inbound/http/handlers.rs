use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::context::AuthenticatedPrincipal;
use crate::domain::principal::models::IssuedSession;
use crate::domain::principal::models::Principal;
use crate::domain::principal::models::SessionMode;
use crate::principal::errors::FieldErrors;
use crate::principal::errors::PrincipalError;

pub mod admin;
pub mod home;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod validate_session;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    UnprocessableEntity(String),
    BadRequest(String),
    Validation(FieldErrors),
    NotFound(String),
    Conflict(FieldErrors),
    Unauthorized(String),
    Forbidden(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Invalid data".to_string(),
                Some(errors),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(errors) => (
                StatusCode::CONFLICT,
                errors.to_string(),
                Some(errors),
            ),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
        };

        (
            status,
            Json(ApiResponseBody::new_error(status, message, errors)),
        )
            .into_response()
    }
}

impl From<PrincipalError> for ApiError {
    fn from(err: PrincipalError) -> Self {
        match err {
            PrincipalError::Validation(errors) => ApiError::Validation(errors),
            PrincipalError::UsernameAlreadyExists(_) => {
                ApiError::Conflict(FieldErrors::single("username", &err))
            }
            PrincipalError::EmailAlreadyExists(_) => {
                ApiError::Conflict(FieldErrors::single("email", &err))
            }
            PrincipalError::InvalidCredentials | PrincipalError::RefreshTokenRejected => {
                ApiError::Unauthorized(err.to_string())
            }
            PrincipalError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PrincipalError::InvalidUsername(_)
            | PrincipalError::InvalidEmail(_)
            | PrincipalError::InvalidPrincipalId(_) => {
                ApiError::UnprocessableEntity(err.to_string())
            }
            PrincipalError::Password(_)
            | PrincipalError::Token(_)
            | PrincipalError::DatabaseError(_) => {
                tracing::error!(error = %err, "Request failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

/// Response envelope: `{ "success", "statusCode", ...data }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    success: bool,
    status_code: u16,
    #[serde(flatten)]
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            success: true,
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            status_code: status_code.as_u16(),
            data: ApiErrorData { message, errors },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

/// Principal profile returned after sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

impl From<&Principal> for PrincipalData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.to_string(),
            username: principal.username.as_str().to_string(),
            email: principal.email.as_str().to_string(),
            full_name: principal.full_name.clone(),
            role: principal.role.clone(),
        }
    }
}

/// Identity of the current caller as carried by its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerData {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&AuthenticatedPrincipal> for CallerData {
    fn from(principal: &AuthenticatedPrincipal) -> Self {
        Self {
            id: principal.id.to_string(),
            username: principal.name.clone(),
            email: principal.email.clone(),
            role: principal.role.clone(),
        }
    }
}

/// Body of a successful login, registration or refresh.
///
/// Tokens are only exposed in bearer mode; in cookie mode the session lives in
/// the cookie alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponseData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: PrincipalData,
}

impl SignInResponseData {
    pub fn new(message: &str, session: &IssuedSession) -> Self {
        let bearer = session.mode == SessionMode::Bearer;
        Self {
            message: message.to_string(),
            token: bearer.then(|| session.access_token.clone()),
            expires_at: bearer.then_some(session.access_token_expires_at),
            refresh_token: session.refresh_token.as_ref().map(|r| r.token.clone()),
            user: (&session.principal).into(),
        }
    }
}

/// Body carrying only a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub message: String,
}

impl MessageData {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
