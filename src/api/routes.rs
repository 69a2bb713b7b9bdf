//! API Routes
//!
//! HTTP endpoint definitions. Each adapter validates its body, makes one
//! external call and wraps the outcome in an `Envelope`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    middleware,
    routing::{get, post},
    Json, Router,
};
use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::gateway::{GatewayError, PaymentIntentParams, Refund};
use crate::mailer::OutgoingEmail;

use super::envelope::Envelope;
use super::middleware::concurrency_limit_middleware;
use super::AppState;

pub const PAYMENT_SUCCESS_MESSAGE: &str = "Payment successful";
pub const REFUND_SUCCESS_MESSAGE: &str = "Payment refund successful";
pub const MAIL_SUCCESS_MESSAGE: &str = "Message has been sent to the customer successfully.";

const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub token: String,
    /// Minor currency units
    pub amount: i64,
    pub receipt_email: String,
}

impl PaymentRequest {
    fn validate(&self) -> AppResult<()> {
        require("token", &self.token)?;
        require("receipt_email", &self.receipt_email)?;
        if self.amount <= 0 {
            return Err(AppError::InvalidInput(
                "amount must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefundRequest {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
}

impl RefundRequest {
    fn validate(&self) -> AppResult<()> {
        require("paymentIntentId", &self.payment_intent_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
    pub subject: String,
    /// HTML body
    pub message: String,
}

impl EmailRequest {
    fn validate(&self) -> AppResult<()> {
        require("email", &self.email)?;
        require("subject", &self.subject)?;
        require("message", &self.message)?;
        self.email.trim().parse::<Mailbox>().map_err(|_| {
            AppError::InvalidInput("email must be a valid email address".to_string())
        })?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentProcessed {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct RefundIssued {
    pub refund: Refund,
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(())
}

/// Unwrap a JSON body, turning extractor rejections into `InvalidInput`
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Optional client-supplied idempotency key, forwarded to the gateway as-is
fn idempotency_key(headers: &HeaderMap) -> AppResult<Option<String>> {
    let Some(value) = headers.get(IDEMPOTENCY_HEADER) else {
        return Ok(None);
    };

    let key = value
        .to_str()
        .map_err(|_| {
            AppError::InvalidInput("Idempotency-Key must be visible ASCII".to_string())
        })?
        .trim();

    if key.is_empty() {
        return Ok(None);
    }
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::InvalidInput(format!(
            "Idempotency-Key must be at most {} characters",
            MAX_IDEMPOTENCY_KEY_LEN
        )));
    }

    Ok(Some(key.to_string()))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let adapters = Router::new()
        .route("/payment/process", post(process_payment))
        .route("/payment/refund", post(refund_payment))
        .route("/send/mail", post(send_mail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            concurrency_limit_middleware,
        ));

    Router::new()
        .route("/api/v2", get(health_check))
        .merge(adapters)
        .with_state(state)
}

// =========================================================================
// GET /api/v2
// =========================================================================

/// Liveness probe
async fn health_check() -> Envelope {
    Envelope::message("Working")
}

// =========================================================================
// POST /payment/process
// =========================================================================

/// Create and confirm a card payment
async fn process_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> AppResult<Envelope<PaymentProcessed>> {
    let request = parse_body(payload)?;
    request.validate()?;
    let idem_key = idempotency_key(&headers)?;

    let params = PaymentIntentParams {
        amount: request.amount,
        currency: state.payment.currency.clone(),
        card_token: request.token,
        receipt_email: request.receipt_email,
        return_url: state.payment.return_url.clone(),
    };

    let intent = state
        .gateway
        .create_payment_intent(&params, idem_key.as_deref())
        .await
        .map_err(AppError::Payment)?;

    let client_secret = intent
        .client_secret
        .filter(|secret| !secret.is_empty())
        .ok_or_else(|| {
            AppError::Payment(GatewayError::InvalidResponse(format!(
                "payment intent {} has no client secret",
                intent.id
            )))
        })?;

    tracing::info!(
        payment_intent_id = %intent.id,
        amount = params.amount,
        currency = %params.currency,
        "Payment processed"
    );

    Ok(Envelope::ok(
        PAYMENT_SUCCESS_MESSAGE,
        PaymentProcessed { client_secret },
    ))
}

// =========================================================================
// POST /payment/refund
// =========================================================================

/// Refund a payment intent in full
async fn refund_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RefundRequest>, JsonRejection>,
) -> AppResult<Envelope<RefundIssued>> {
    let request = parse_body(payload)?;
    request.validate()?;
    let idem_key = idempotency_key(&headers)?;

    let refund = state
        .gateway
        .create_refund(request.payment_intent_id.trim(), idem_key.as_deref())
        .await
        .map_err(AppError::Refund)?;

    tracing::info!(
        refund_id = %refund.id,
        payment_intent_id = %request.payment_intent_id,
        "Payment refunded"
    );

    Ok(Envelope::ok(REFUND_SUCCESS_MESSAGE, RefundIssued { refund }))
}

// =========================================================================
// POST /send/mail
// =========================================================================

/// Send one transactional email
async fn send_mail(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> AppResult<Envelope> {
    let request = parse_body(payload)?;
    request.validate()?;

    let email = OutgoingEmail {
        to: request.email,
        subject: request.subject,
        html: request.message,
    };

    state.mailer.send(&email).await?;

    Ok(Envelope::message(MAIL_SUCCESS_MESSAGE))
}
