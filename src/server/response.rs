//! JSON envelope shared by every endpoint: `{ success, message?, data? }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(message: Option<&str>, data: Option<T>) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            message: message.map(String::from),
            data,
        }),
    )
        .into_response()
}

pub fn failure<M: Into<String>>(status: StatusCode, message: M) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            message: Some(message.into()),
            data: None,
        }),
    )
        .into_response()
}
