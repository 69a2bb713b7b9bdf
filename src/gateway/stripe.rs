//! Stripe Client
//!
//! `PaymentGateway` over the Stripe REST API (form-encoded requests,
//! bearer secret key, JSON responses).

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::PaymentConfig;

use super::{GatewayError, PaymentGateway, PaymentIntent, PaymentIntentParams, Refund};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Stripe REST client
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: Option<String>,
}

/// Error body returned by the gateway on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorObject,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    pub fn new(config: &PaymentConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    pub fn with_http_client(http: Client, config: &PaymentConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }

    /// Build an authenticated POST for `path`
    fn post(
        &self,
        path: &str,
        idempotency_key: Option<&str>,
    ) -> Result<RequestBuilder, GatewayError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;

        let request = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(secret_key);

        Ok(match idempotency_key {
            Some(key) => request.header(IDEMPOTENCY_HEADER, key),
            None => request,
        })
    }

    /// Decode a gateway response, mapping error bodies to `GatewayError::Api`
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&body)
                .map_err(|e| GatewayError::InvalidResponse(e.to_string()));
        }

        let error = serde_json::from_slice::<ErrorBody>(&body).ok().map(|b| b.error);
        let (kind, code, message) = match error {
            Some(error) => (error.kind, error.code, error.message),
            None => (None, None, None),
        };

        Err(GatewayError::Api {
            status: status.as_u16(),
            kind,
            code,
            message: message
                .unwrap_or_else(|| format!("Payment gateway returned HTTP {}", status.as_u16())),
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError> {
        let response = self
            .post("/v1/payment_intents", idempotency_key)?
            .form(&params.to_form())
            .send()
            .await?;

        let intent: PaymentIntent = Self::decode(response).await?;

        tracing::debug!(
            payment_intent_id = %intent.id,
            status = ?intent.status,
            "Payment intent created"
        );

        Ok(intent)
    }

    async fn create_refund(
        &self,
        payment_intent_id: &str,
        idempotency_key: Option<&str>,
    ) -> Result<Refund, GatewayError> {
        let response = self
            .post("/v1/refunds", idempotency_key)?
            .form(&[("payment_intent", payment_intent_id)])
            .send()
            .await?;

        let refund: Refund = Self::decode(response).await?;

        tracing::debug!(
            refund_id = %refund.id,
            payment_intent_id = %payment_intent_id,
            status = ?refund.status,
            "Refund created"
        );

        Ok(refund)
    }
}
