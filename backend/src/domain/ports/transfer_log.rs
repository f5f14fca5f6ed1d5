//! Port abstraction for the case transfer history.

use async_trait::async_trait;

use crate::domain::assignment::TransferRecord;
use crate::domain::case::CaseId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by transfer log adapters.
    pub enum TransferLogError {
        /// Repository connection could not be established.
        Connection { message: String } => "transfer log connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "transfer log query failed: {message}",
    }
}

/// Driven port recording who moved a case between agents, and why.
#[async_trait]
pub trait TransferLogRepository: Send + Sync {
    /// Append a transfer record.
    async fn record(&self, transfer: &TransferRecord) -> Result<(), TransferLogError>;

    /// List a case's transfers, newest first.
    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TransferRecord>, TransferLogError>;
}
