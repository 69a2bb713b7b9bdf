//! Mailer module
//!
//! Transactional email delivery behind the `Mailer` trait. `SmtpMailer`
//! opens a fresh SMTP transport for every message.

mod smtp;

use async_trait::async_trait;

pub use smtp::{well_known_service, SmtpMailer};

/// Sends a single email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// One HTML email to one recipient
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    /// HTML body, sent verbatim
    pub html: String,
}

/// Mail delivery errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("{0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
