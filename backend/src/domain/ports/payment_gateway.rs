//! Driving port wrapping the external payment provider.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment gateway adapters.
    pub enum PaymentGatewayError {
        /// The provider endpoint or credentials are not configured.
        NotConfigured => "payment provider is not configured",
        /// The provider rejected or failed the request.
        Provider { message: String } => "payment provider error: {message}",
    }
}

/// A freshly created provider-side payment intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// Opaque provider reference persisted with the payment.
    pub provider_ref: String,
    /// Secret handed to the browser to complete the payment.
    pub client_secret: String,
}

/// Driven port creating payment intents with the provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent for the given amount.
    ///
    /// `reference` is the human-facing case reference, forwarded so the
    /// provider dashboard stays navigable.
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError>;
}

/// Gateway used when no provider is configured; always fails.
///
/// Unlike the notification channels, payments are a primary operation, so
/// the caller sees a 503 instead of silent success.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPaymentGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredPaymentGateway {
    async fn create_intent(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        Err(PaymentGatewayError::not_configured())
    }
}
