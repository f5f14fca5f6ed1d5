//! Port abstraction for notification persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification repository adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

/// Driven port for notification persistence.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a new notification.
    async fn insert(&self, notification: &Notification)
        -> Result<(), NotificationPersistenceError>;

    /// List a user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    /// Mark one notification read; returns whether it belonged to the user.
    async fn mark_read(
        &self,
        id: Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationPersistenceError>;

    /// Mark all of the user's notifications read; returns the updated count.
    async fn mark_all_read(&self, user_id: &UserId)
        -> Result<u64, NotificationPersistenceError>;
}
