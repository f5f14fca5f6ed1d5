//! Payment use-cases: intent creation and provider webhook application.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::CaseId;
use crate::domain::notification::{Notification, NotificationFanout, NotificationKind};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{
    ActivityLogRepository, CasePersistenceError, CaseRepository, PaymentGateway,
    PaymentGatewayError, PaymentPersistenceError, PaymentRepository,
};
use crate::domain::user::{Role, User};
use crate::domain::Error;

/// Result of creating a payment: the stored record plus the browser secret.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPayment {
    pub payment: Payment,
    pub client_secret: String,
}

/// How a provider webhook event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The payment moved to a new status.
    Applied(PaymentStatus),
    /// The event restated the current status; nothing changed.
    Replayed,
}

/// Payment use-cases over the payment, gateway, and case ports.
#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    cases: Arc<dyn CaseRepository>,
    activity: Arc<dyn ActivityLogRepository>,
    fanout: NotificationFanout,
}

fn map_payment_error(error: PaymentPersistenceError) -> Error {
    match error {
        PaymentPersistenceError::Connection { message } => Error::service_unavailable(message),
        PaymentPersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_case_error(error: CasePersistenceError) -> Error {
    match error {
        CasePersistenceError::Connection { message } => Error::service_unavailable(message),
        CasePersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> Error {
    match error {
        PaymentGatewayError::NotConfigured => {
            Error::service_unavailable("payment provider is not configured")
        }
        PaymentGatewayError::Provider { message } => {
            Error::service_unavailable(format!("payment provider error: {message}"))
        }
    }
}

impl PaymentService {
    /// Assemble the service over its ports.
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        cases: Arc<dyn CaseRepository>,
        activity: Arc<dyn ActivityLogRepository>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            payments,
            gateway,
            cases,
            activity,
            fanout,
        }
    }

    /// Create a provider intent and persist the pending payment.
    ///
    /// Only the case's client may pay for it; staff raise invoices through
    /// other channels.
    pub async fn create(
        &self,
        actor: &User,
        case_id: CaseId,
        amount_cents: i64,
        currency: &str,
    ) -> Result<CreatedPayment, Error> {
        let case = self
            .cases
            .find_by_id(&case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("case not found"))?;
        if case.client_id != actor.id {
            return Err(Error::not_found("case not found"));
        }
        if case.status.is_terminal() {
            return Err(Error::invalid_request("case is closed"));
        }

        crate::domain::payment::validate_amount(amount_cents)?;
        let currency = crate::domain::payment::validate_currency(currency)?;

        let intent = self
            .gateway
            .create_intent(amount_cents, &currency, case.reference.as_ref())
            .await
            .map_err(map_gateway_error)?;

        let payment = Payment::new(
            case_id,
            actor.id,
            amount_cents,
            &currency,
            intent.provider_ref,
        )?;
        self.payments
            .insert(&payment)
            .await
            .map_err(map_payment_error)?;

        Ok(CreatedPayment {
            payment,
            client_secret: intent.client_secret,
        })
    }

    /// List a case's payments for a participant or staff member.
    pub async fn list_for_case(
        &self,
        actor: &User,
        case_id: CaseId,
    ) -> Result<Vec<Payment>, Error> {
        let case = self
            .cases
            .find_by_id(&case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("case not found"))?;
        if !(actor.role == Role::Admin || case.is_participant(&actor.id)) {
            return Err(Error::not_found("case not found"));
        }
        self.payments
            .list_for_case(&case_id)
            .await
            .map_err(map_payment_error)
    }

    /// Apply a provider-reported status to the referenced payment.
    ///
    /// Retried events are idempotent; the client is only notified when the
    /// status actually changes.
    pub async fn apply_provider_event(
        &self,
        provider_ref: &str,
        status: PaymentStatus,
    ) -> Result<WebhookOutcome, Error> {
        let mut payment = self
            .payments
            .find_by_provider_ref(provider_ref)
            .await
            .map_err(map_payment_error)?
            .ok_or_else(|| Error::not_found("unknown payment reference"))?;

        if !payment.apply_provider_status(status)? {
            return Ok(WebhookOutcome::Replayed);
        }
        self.payments
            .update(&payment)
            .await
            .map_err(map_payment_error)?;

        let entry = ActivityEntry::new(
            payment.client_id,
            "payment_status_changed",
            Some(payment.case_id),
            json!({ "providerRef": provider_ref, "status": status.as_str() }),
        );
        if let Err(error) = self.activity.record(&entry).await {
            warn!(case_id = %payment.case_id, %error, "failed to record payment activity");
        }

        self.fanout.spawn_dispatch(
            Notification::new(
                payment.client_id,
                NotificationKind::PaymentUpdate,
                "Payment update",
                format!("Your payment is now {status}"),
                Some(payment.case_id),
            ),
            None,
        );
        Ok(WebhookOutcome::Applied(status))
    }
}
