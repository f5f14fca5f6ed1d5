//! Inbound webhooks from the payment and email providers.
//!
//! Both endpoints sit outside `/api/v1` and outside the session layer; they
//! authenticate with provider secrets instead.
//!
//! ```text
//! POST /webhooks/payments  (x-webhook-signature: hex sha256(secret + body))
//! POST /webhooks/email     (x-webhook-secret: shared secret)
//! ```

use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::billing::WebhookOutcome;
use crate::domain::messaging::InboundEmailOutcome;
use crate::domain::payment::PaymentStatus;
use crate::domain::user::Email;
use crate::domain::Error;
use crate::inbound::http::envelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Header carrying the payment provider's body signature.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";
/// Header carrying the inbound email shared secret.
pub const EMAIL_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvent {
    pub provider_ref: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct InboundEmail {
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
}

/// Byte-wise comparison that does not short-circuit on the first mismatch.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn verify_signature(secret: &str, body: &[u8], provided: &str) -> bool {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(body);
    let expected = hex::encode(hasher.finalize());
    constant_time_eq(expected.as_bytes(), provided.as_bytes())
}

fn header_value<'r>(req: &'r HttpRequest, name: &str) -> Option<&'r str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Apply a payment provider event.
///
/// The body is read raw so the signature covers exactly the bytes the
/// provider signed, before any JSON parsing.
#[utoipa::path(
    post,
    path = "/webhooks/payments",
    request_body = PaymentEvent,
    responses(
        (status = 200, description = "Event applied or replayed"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 404, description = "Unknown provider reference"),
        (status = 409, description = "Illegal status transition"),
    ),
    tags = ["webhooks"],
    operation_id = "paymentWebhook",
    security([])
)]
#[post("/webhooks/payments")]
pub async fn payment_webhook(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let Some(secret) = state.webhook_secrets.payments.as_deref() else {
        return Err(Error::service_unavailable("payment webhook is not configured"));
    };
    let provided = header_value(&req, SIGNATURE_HEADER)
        .ok_or_else(|| Error::unauthorized("missing webhook signature"))?;
    if !verify_signature(secret, &body, provided) {
        return Err(Error::unauthorized("invalid webhook signature"));
    }

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|error| Error::invalid_request(format!("malformed payment event: {error}")))?;
    let outcome = state
        .payments
        .apply_provider_event(&event.provider_ref, event.status)
        .await?;
    let applied = matches!(outcome, WebhookOutcome::Applied(_));
    Ok(envelope::ok(json!({ "applied": applied })))
}

/// Ingest an inbound email from the mail provider.
///
/// Always answers 202 for authenticated calls with unknown senders; the
/// webhook must not reveal which addresses have accounts.
#[utoipa::path(
    post,
    path = "/webhooks/email",
    request_body = InboundEmail,
    responses(
        (status = 200, description = "Email routed to a case or notification"),
        (status = 202, description = "Accepted and dropped"),
        (status = 401, description = "Missing or invalid shared secret"),
    ),
    tags = ["webhooks"],
    operation_id = "emailWebhook",
    security([])
)]
#[post("/webhooks/email")]
pub async fn email_webhook(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<InboundEmail>,
) -> ApiResult<HttpResponse> {
    let Some(secret) = state.webhook_secrets.email.as_deref() else {
        return Err(Error::service_unavailable("email webhook is not configured"));
    };
    let provided = header_value(&req, EMAIL_SECRET_HEADER)
        .ok_or_else(|| Error::unauthorized("missing webhook secret"))?;
    if !constant_time_eq(secret.as_bytes(), provided.as_bytes()) {
        return Err(Error::unauthorized("invalid webhook secret"));
    }

    let Ok(from) = Email::new(&payload.from) else {
        // Malformed senders are accepted and dropped like unknown ones.
        return Ok(envelope::accepted("dropped"));
    };
    let outcome = state
        .messages
        .ingest_inbound_email(&from, &payload.subject, &payload.text)
        .await?;
    match outcome {
        InboundEmailOutcome::AppendedToCase => Ok(envelope::ok(json!({ "routed": "case" }))),
        InboundEmailOutcome::StoredAsNotification => {
            Ok(envelope::ok(json!({ "routed": "notification" })))
        }
        InboundEmailOutcome::Dropped => {
            info!("inbound email from unknown sender dropped");
            Ok(envelope::accepted("dropped"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn signature_verifies_secret_plus_body() {
        let body = br#"{"providerRef":"pi_1","status":"succeeded"}"#;
        let mut hasher = Sha256::new();
        hasher.update(b"topsecret");
        hasher.update(body);
        let signature = hex::encode(hasher.finalize());

        assert!(verify_signature("topsecret", body, &signature));
        assert!(!verify_signature("wrong", body, &signature));
        assert!(!verify_signature("topsecret", b"tampered", &signature));
    }

    #[test]
    fn constant_time_eq_rejects_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(constant_time_eq(b"abc", b"abc"));
    }
}
