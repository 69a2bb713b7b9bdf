//! Response Envelope
//!
//! Every endpoint answers `{success, message, ...extra}`: 200 on success,
//! the error's status (500 for external failures) otherwise.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Normalized JSON response body.
///
/// `extra` is flattened into the top-level object, so its fields sit next
/// to `success` and `message`.
#[derive(Debug, Serialize)]
pub struct Envelope<T = ()> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub extra: Option<T>,
}

impl Envelope<()> {
    /// Success envelope with no extra fields
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            extra: None,
        }
    }

    /// Failure envelope
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            extra: None,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Success envelope carrying extra fields
    pub fn ok(message: impl Into<String>, extra: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            extra: Some(extra),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}
