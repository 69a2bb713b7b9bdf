//! Shared application state

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::config::Config;
use crate::gateway::{PaymentGateway, StripeClient};
use crate::mailer::{Mailer, SmtpMailer};

/// Fixed payment parameters applied to every payment intent
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub currency: String,
    pub return_url: Option<String>,
}

/// State handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub payment: PaymentSettings,
    /// Permits for in-flight adapter requests
    pub limiter: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        payment: PaymentSettings,
        max_in_flight_requests: usize,
    ) -> Self {
        Self {
            gateway,
            mailer,
            payment,
            limiter: Arc::new(Semaphore::new(max_in_flight_requests)),
        }
    }

    /// Production wiring: Stripe for payments, SMTP for mail
    pub fn from_config(config: &Config) -> Self {
        let payment = PaymentSettings {
            currency: config.payment.currency.clone(),
            return_url: config.payment_return_url(),
        };

        Self::new(
            Arc::new(StripeClient::new(&config.payment)),
            Arc::new(SmtpMailer::new(config.smtp.clone())),
            payment,
            config.max_in_flight_requests,
        )
    }
}
