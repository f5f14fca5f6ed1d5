//! Payments against cases and the provider webhook transition rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::user::UserId;
use crate::domain::Error;

/// Provider-facing payment state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Stable snake_case name used in persistence and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Parse the persisted snake_case representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "succeeded" => Some(Self::Succeeded),
            "failed" => Some(Self::Failed),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Whether a webhook may move a payment from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Succeeded)
                | (Self::Pending, Self::Failed)
                | (Self::Succeeded, Self::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment record tied to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub client_id: UserId,
    pub amount_cents: i64,
    #[schema(example = "EUR")]
    pub currency: String,
    pub status: PaymentStatus,
    /// Opaque reference issued by the payment provider.
    pub provider_ref: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Build a new pending payment after validating amount and currency.
    pub fn new(
        case_id: CaseId,
        client_id: UserId,
        amount_cents: i64,
        currency: &str,
        provider_ref: impl Into<String>,
    ) -> Result<Self, Error> {
        validate_amount(amount_cents)?;
        let currency = validate_currency(currency)?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            case_id,
            client_id,
            amount_cents,
            currency,
            status: PaymentStatus::Pending,
            provider_ref: provider_ref.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a provider-reported status.
    ///
    /// Returns `Ok(true)` when the status changed, `Ok(false)` for a
    /// replayed event reporting the current status (webhook retries are
    /// expected and must be idempotent), and a conflict for anything else.
    pub fn apply_provider_status(&mut self, next: PaymentStatus) -> Result<bool, Error> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(Error::conflict(format!(
                "payment cannot move from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(true)
    }
}

/// Positive, provider-representable amount.
pub fn validate_amount(amount_cents: i64) -> Result<(), Error> {
    if amount_cents <= 0 {
        return Err(Error::invalid_request("amountCents must be positive"));
    }
    Ok(())
}

/// Upper-case three-letter ISO currency code.
pub fn validate_currency(currency: &str) -> Result<String, Error> {
    let normalized = currency.trim().to_ascii_uppercase();
    if normalized.len() != 3 || !normalized.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::invalid_request(
            "currency must be a three-letter ISO code",
        ));
    }
    Ok(normalized)
}
