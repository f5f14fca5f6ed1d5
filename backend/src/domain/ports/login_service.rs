//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this to authenticate credentials without knowing
//! (or importing) the backing infrastructure, which keeps HTTP handler tests
//! deterministic: they substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::user::User;
use crate::domain::Error;

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown email and wrong password both map to the same unauthorized
    /// error; suspended accounts are forbidden.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
