use axum::http::StatusCode;

use super::ApiSuccess;
use super::MessageData;

pub async fn home() -> ApiSuccess<MessageData> {
    ApiSuccess::new(StatusCode::OK, MessageData::new("Welcome"))
}
