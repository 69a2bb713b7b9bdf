//! Payment Gateway module
//!
//! Abstraction over the external payment processor. Adapters only talk to
//! `PaymentGateway`; `StripeClient` is the production implementation.

mod stripe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use stripe::StripeClient;

/// External payment processor operations
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create and synchronously confirm a payment intent
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError>;

    /// Refund the full amount captured by a payment intent
    async fn create_refund(
        &self,
        payment_intent_id: &str,
        idempotency_key: Option<&str>,
    ) -> Result<Refund, GatewayError>;
}

/// Parameters for a confirmed card payment intent
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentIntentParams {
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    /// Opaque card token from the client
    pub card_token: String,
    pub receipt_email: String,
    pub return_url: Option<String>,
}

impl PaymentIntentParams {
    /// Form-encoded body for the payment intent endpoint.
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("amount", self.amount.to_string()),
            ("currency", self.currency.clone()),
            ("confirm", "true".to_string()),
            ("payment_method_data[type]", "card".to_string()),
            ("payment_method_data[card][token]", self.card_token.clone()),
            ("receipt_email", self.receipt_email.clone()),
        ];
        if let Some(ref return_url) = self.return_url {
            form.push(("return_url", return_url.clone()));
        }
        form
    }
}

/// Payment intent as returned by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Refund object as returned by the gateway.
///
/// Fields the service does not read are kept in `extra` so the caller
/// receives the object unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Payment gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No secret key configured
    #[error("Payment gateway API key is not configured")]
    MissingApiKey,

    /// The gateway answered with an error object
    #[error("{message}")]
    Api {
        status: u16,
        kind: Option<String>,
        code: Option<String>,
        message: String,
    },

    /// Network or protocol failure talking to the gateway
    #[error("Payment gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway answered 2xx with a body we could not read
    #[error("Unexpected payment gateway response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Check if the gateway rejected the request itself (card declined,
    /// unknown payment intent) rather than failing to answer
    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Api { status, .. } if (400..500).contains(status))
    }
}
