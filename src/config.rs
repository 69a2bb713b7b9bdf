//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Maximum number of adapter requests handled at once
    pub max_in_flight_requests: usize,

    /// Public-facing domain, used for payment redirect URLs
    pub domain: Option<String>,

    /// Payment gateway settings
    pub payment: PaymentConfig,

    /// Outbound mail settings
    pub smtp: SmtpConfig,
}

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Secret API key. Checked when a call is made, not at startup.
    pub secret_key: Option<String>,

    /// Gateway base URL
    pub api_base: String,

    /// Currency applied to every payment intent
    pub currency: String,
}

/// SMTP configuration
#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Well-known provider shortcut (e.g. "gmail")
    pub service: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Sender address
    pub from: Option<String>,
}

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

impl Config {
    /// Load `.env` files unless running in production.
    ///
    /// `config/.env` is read first so it wins over `./.env`; variables
    /// already present in the process environment are never overridden.
    pub fn load_env_files() {
        Self::load_env_files_in(Path::new("."));
    }

    fn load_env_files_in(dir: &Path) {
        let environment = env::var("ENVIRONMENT").unwrap_or_default();
        if environment.eq_ignore_ascii_case("production") {
            return;
        }

        for path in [dir.join("config").join(".env"), dir.join(".env")] {
            if path.exists() {
                dotenvy::from_path(&path).ok();
            }
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let max_in_flight_requests: usize = env::var("MAX_IN_FLIGHT_REQUESTS")
            .unwrap_or_else(|_| "64".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("MAX_IN_FLIGHT_REQUESTS"))?;
        if max_in_flight_requests == 0 {
            return Err(ConfigError::InvalidValue("MAX_IN_FLIGHT_REQUESTS"));
        }

        let domain = non_empty_var(&["DOMAIN"]).map(|d| d.trim_end_matches('/').to_string());

        let payment = PaymentConfig {
            secret_key: non_empty_var(&["STRIPE_SECRET_KEY", "STRIPE_SEC_KEY"]),
            api_base: non_empty_var(&["STRIPE_API_BASE"])
                .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE.to_string()),
            currency: non_empty_var(&["PAYMENT_CURRENCY"])
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or_else(|| "aud".to_string()),
        };

        let smtp_port = match non_empty_var(&["SMTP_PORT", "SMPT_PORT"]) {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|_| ConfigError::InvalidValue("SMTP_PORT"))?,
            ),
            None => None,
        };

        let smtp = SmtpConfig {
            host: non_empty_var(&["SMTP_HOST", "SMPT_HOST"]),
            port: smtp_port,
            service: non_empty_var(&["SMTP_SERVICE", "SMPT_SERVICE"]),
            user: non_empty_var(&["SMTP_USER", "SMPT_USER"]),
            password: non_empty_var(&["SMTP_PASSWORD", "SMPT_PASSWORD"]),
            from: non_empty_var(&["SMTP_MAIL", "SMPT_MAIL"]),
        };

        Ok(Self {
            host,
            port,
            environment,
            max_in_flight_requests,
            domain,
            payment,
            smtp,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Redirect target for payments that need an extra customer step (3-D Secure)
    pub fn payment_return_url(&self) -> Option<String> {
        self.domain
            .as_ref()
            .map(|domain| format!("{}/booking/payment", domain))
    }
}

/// First non-empty value among `names`; later names are legacy aliases.
fn non_empty_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
