//! Success response envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Envelope wrapping every successful payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// Human-readable summary.
    pub message: String,
    /// Payload.
    pub data: T,
}

/// Builds a success response with the given status, message and payload.
pub fn success<T: Serialize>(status: StatusCode, message: &str, data: T) -> Response {
    (
        status,
        Json(ApiResponse {
            status_code: status.as_u16(),
            message: message.to_string(),
            data,
        }),
    )
        .into_response()
}
