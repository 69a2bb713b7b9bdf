//! Error handling module
//!
//! Centralized error types and HTTP response conversion. Every error
//! renders as the failure envelope `{success: false, message}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::envelope::Envelope;
use crate::gateway::GatewayError;
use crate::mailer::MailError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Caller-facing message for any payment failure
pub const PAYMENT_FAILED_MESSAGE: &str = "Payment failed!, Something went wrong";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidInput(String),

    // External call failures (5xx)
    #[error("Payment failed: {0}")]
    Payment(#[source] GatewayError),

    #[error("Refund failed: {0}")]
    Refund(#[source] GatewayError),

    #[error("Email delivery failed: {0}")]
    Mail(#[from] MailError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Payment(_) | AppError::Refund(_) | AppError::Mail(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Payment(_) => PAYMENT_FAILED_MESSAGE.to_string(),
            AppError::Refund(e) => e.to_string(),
            AppError::Mail(e) => e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidInput(msg) => {
                tracing::debug!("Rejected request: {}", msg);
            }
            AppError::Payment(e) | AppError::Refund(e) if e.is_rejection() => {
                tracing::warn!("{}", self);
            }
            AppError::Payment(e) | AppError::Refund(e) => {
                tracing::error!("{}: {:?}", self, e);
            }
            AppError::Mail(e) => {
                tracing::error!("Email delivery failed: {:?}", e);
            }
        }

        let status = self.status_code();
        (status, Envelope::failure(self.public_message())).into_response()
    }
}
