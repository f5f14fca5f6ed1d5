//! Port abstraction for case message persistence.

use async_trait::async_trait;

use crate::domain::case::CaseId;
use crate::domain::message::CaseMessage;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by message repository adapters.
    pub enum MessagePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "message repository query failed: {message}",
    }
}

/// Driven port for case message persistence.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert a new message.
    async fn insert(&self, message: &CaseMessage) -> Result<(), MessagePersistenceError>;

    /// List a case's messages, oldest first.
    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<CaseMessage>, MessagePersistenceError>;

    /// Mark all messages on the case not sent by `reader` as read.
    ///
    /// Returns the number of messages updated.
    async fn mark_read(
        &self,
        case_id: &CaseId,
        reader: &UserId,
    ) -> Result<u64, MessagePersistenceError>;
}
