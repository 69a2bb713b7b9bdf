//! Common test utilities
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use checkout_backend::gateway::{
    GatewayError, PaymentGateway, PaymentIntent, PaymentIntentParams, Refund,
};
use checkout_backend::mailer::{MailError, Mailer, OutgoingEmail};
use checkout_backend::{build_router, AppState, PaymentSettings};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

pub const RETURN_URL: &str = "https://shop.example.com/booking/payment";

/// Gateway double that records every call
#[derive(Default)]
pub struct StubGateway {
    reject_with: Option<(u16, String)>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub payment_calls: Mutex<Vec<(PaymentIntentParams, Option<String>)>>,
    pub refund_calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StubGateway {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        Self {
            reject_with: Some((status, message.to_string())),
            ..Default::default()
        }
    }

    /// Accepts every call after sleeping for `delay`
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    async fn enter(&self) -> Result<(), GatewayError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.reject_with {
            Some((status, message)) => Err(GatewayError::Api {
                status: *status,
                kind: Some("invalid_request_error".to_string()),
                code: None,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
        idempotency_key: Option<&str>,
    ) -> Result<PaymentIntent, GatewayError> {
        self.payment_calls
            .lock()
            .unwrap()
            .push((params.clone(), idempotency_key.map(str::to_string)));
        self.enter().await?;

        Ok(PaymentIntent {
            id: "pi_test_123".to_string(),
            client_secret: Some("pi_test_123_secret_abc".to_string()),
            status: Some("succeeded".to_string()),
            amount: Some(params.amount),
            currency: Some(params.currency.clone()),
        })
    }

    async fn create_refund(
        &self,
        payment_intent_id: &str,
        idempotency_key: Option<&str>,
    ) -> Result<Refund, GatewayError> {
        self.refund_calls.lock().unwrap().push((
            payment_intent_id.to_string(),
            idempotency_key.map(str::to_string),
        ));
        self.enter().await?;

        let mut extra = serde_json::Map::new();
        extra.insert("object".to_string(), Value::from("refund"));

        Ok(Refund {
            id: "re_test_456".to_string(),
            amount: Some(1000),
            currency: Some("aud".to_string()),
            status: Some("succeeded".to_string()),
            payment_intent: Some(payment_intent_id.to_string()),
            extra,
        })
    }
}

/// Mailer double that records every attempt
#[derive(Default)]
pub struct StubMailer {
    fail: bool,
    pub attempts: Mutex<Vec<OutgoingEmail>>,
}

impl StubMailer {
    pub fn working() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.attempts.lock().unwrap().push(email.clone());
        if self.fail {
            return Err(MailError::NotConfigured("SMTP host"));
        }
        Ok(())
    }
}

pub fn payment_settings() -> PaymentSettings {
    PaymentSettings {
        currency: "aud".to_string(),
        return_url: Some(RETURN_URL.to_string()),
    }
}

/// Full router wired to the given doubles
pub fn app_with_limit(
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    max_in_flight: usize,
) -> Router {
    build_router(AppState::new(
        gateway,
        mailer,
        payment_settings(),
        max_in_flight,
    ))
}

pub fn app(gateway: Arc<dyn PaymentGateway>, mailer: Arc<dyn Mailer>) -> Router {
    app_with_limit(gateway, mailer, 8)
}

/// POST a JSON body and decode the JSON response
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: Value,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    read_json(response).await
}

pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}
