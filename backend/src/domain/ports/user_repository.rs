//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::user::{Email, Role, User, UserId, UserStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email address is already registered.
        DuplicateEmail => "email address is already registered",
    }
}

/// Driven port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record together with its password digest.
    ///
    /// Fails with [`UserPersistenceError::DuplicateEmail`] when the email
    /// uniqueness constraint is violated.
    async fn insert(
        &self,
        user: &User,
        salt_hex: &str,
        digest_hex: &str,
    ) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// List users, optionally filtered by role, newest first.
    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError>;

    /// Update account status; returns the updated user when it exists.
    async fn update_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Count users that are active admins.
    async fn count_active_admins(&self) -> Result<u64, UserPersistenceError>;

    /// Conditionally replace the avatar URL (optimistic lock).
    ///
    /// The write only applies when the stored URL still equals `expected`;
    /// returns whether a row was updated.
    async fn set_avatar_if_matches(
        &self,
        id: &UserId,
        new_url: Option<&str>,
        expected: Option<&str>,
    ) -> Result<bool, UserPersistenceError>;
}
