//! Port abstraction for invite code persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::invite::InviteCode;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by invite repository adapters.
    pub enum InvitePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "invite repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invite repository query failed: {message}",
    }
}

/// Driven port for invite code persistence.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Insert a new invite.
    async fn insert(&self, invite: &InviteCode) -> Result<(), InvitePersistenceError>;

    /// List all invites, newest first.
    async fn list(&self) -> Result<Vec<InviteCode>, InvitePersistenceError>;

    /// Fetch an invite by its code string.
    async fn find_by_code(&self, code: &str)
        -> Result<Option<InviteCode>, InvitePersistenceError>;

    /// Mark an invite revoked; returns whether it existed.
    async fn revoke(&self, id: Uuid) -> Result<bool, InvitePersistenceError>;

    /// Atomically consume one use of the invite.
    ///
    /// The increment is conditional (`used_count < max_uses AND NOT revoked`)
    /// so concurrent registrations cannot overspend a code. Returns whether
    /// a use was consumed.
    async fn try_consume(&self, id: Uuid) -> Result<bool, InvitePersistenceError>;
}
