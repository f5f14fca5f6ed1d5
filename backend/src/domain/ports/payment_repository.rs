//! Port abstraction for payment record persistence.

use async_trait::async_trait;

use crate::domain::case::CaseId;
use crate::domain::payment::Payment;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by payment repository adapters.
    pub enum PaymentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "payment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "payment repository query failed: {message}",
    }
}

/// Driven port for payment persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment.
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError>;

    /// List a case's payments, newest first.
    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<Payment>, PaymentPersistenceError>;

    /// Fetch a payment by the provider's opaque reference.
    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Payment>, PaymentPersistenceError>;

    /// Persist the current state of an existing payment.
    async fn update(&self, payment: &Payment) -> Result<(), PaymentPersistenceError>;
}
