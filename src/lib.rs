//! checkout_backend Library
//!
//! Payment, refund and transactional email adapters behind a small HTTP API.
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod config;
pub mod gateway;
pub mod mailer;
pub mod supervisor;

mod error;

pub use api::{build_router, AppState, Envelope, PaymentSettings};
pub use config::Config;
pub use error::{AppError, AppResult, PAYMENT_FAILED_MESSAGE};
