//! SMTP Mailer
//!
//! Builds the transport from `SmtpConfig` on every send. A well-known
//! service name decides host and port; `SMTP_HOST` / `SMTP_PORT` apply
//! only when no known service is configured.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

use super::{MailError, Mailer, OutgoingEmail};

/// Port that expects TLS from the first byte
const IMPLICIT_TLS_PORT: u16 = 465;
const DEFAULT_SUBMISSION_PORT: u16 = 587;

/// Host and port for a provider shortcut such as "gmail"
pub fn well_known_service(name: &str) -> Option<(&'static str, u16)> {
    let service = match name.trim().to_ascii_lowercase().as_str() {
        "gmail" | "googlemail" => ("smtp.gmail.com", 465),
        "outlook" | "hotmail" => ("smtp-mail.outlook.com", 587),
        "outlook365" | "office365" => ("smtp.office365.com", 587),
        "yahoo" => ("smtp.mail.yahoo.com", 465),
        "sendgrid" => ("smtp.sendgrid.net", 587),
        "mailgun" => ("smtp.mailgun.org", 465),
        "zoho" => ("smtp.zoho.com", 465),
        "ses" => ("email-smtp.us-east-1.amazonaws.com", 465),
        _ => return None,
    };
    Some(service)
}

/// Resolved connection endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoint {
    host: String,
    port: u16,
}

/// How the connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    /// TLS from the first byte
    Wrapper,
    /// STARTTLS when the server offers it
    Opportunistic,
}

impl TlsMode {
    fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            TlsMode::Wrapper
        } else {
            TlsMode::Opportunistic
        }
    }

    fn with_parameters(self, parameters: TlsParameters) -> Tls {
        match self {
            TlsMode::Wrapper => Tls::Wrapper(parameters),
            TlsMode::Opportunistic => Tls::Opportunistic(parameters),
        }
    }
}

/// SMTP-backed mailer
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn endpoint(&self) -> Result<Endpoint, MailError> {
        if let Some(name) = self.config.service.as_deref() {
            match well_known_service(name) {
                Some((host, port)) => {
                    return Ok(Endpoint {
                        host: host.to_string(),
                        port,
                    })
                }
                None => tracing::warn!(
                    service = name,
                    "Unknown SMTP service shortcut, falling back to SMTP_HOST"
                ),
            }
        }

        let host = self
            .config
            .host
            .clone()
            .ok_or(MailError::NotConfigured("SMTP host"))?;
        let port = self.config.port.unwrap_or(DEFAULT_SUBMISSION_PORT);

        Ok(Endpoint { host, port })
    }

    /// Login used only when both user and password are set
    fn credentials(&self) -> Option<Credentials> {
        match (&self.config.user, &self.config.password) {
            (Some(user), Some(password)) => Some(Credentials::new(user.clone(), password.clone())),
            _ => None,
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let endpoint = self.endpoint()?;
        let tls_parameters = TlsParameters::new(endpoint.host.clone())?;
        let tls = TlsMode::for_port(endpoint.port).with_parameters(tls_parameters);

        let builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(endpoint.host)
            .port(endpoint.port)
            .tls(tls);

        let builder = match self.credentials() {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };

        Ok(builder.build())
    }

    fn message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let from: Mailbox = self
            .config
            .from
            .as_deref()
            .ok_or(MailError::NotConfigured("sender address"))?
            .parse()?;
        let to: Mailbox = email.to.trim().parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())?;

        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.message(email)?;
        let transport = self.transport()?;

        let response = transport.send(message).await?;

        tracing::info!(
            recipient = %email.to,
            smtp_code = %response.code(),
            "Email accepted by SMTP server"
        );

        Ok(())
    }
}
