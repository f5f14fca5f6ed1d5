//! Invite-gated account registration.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::auth::{CredentialsValidationError, PasswordDigest, PASSWORD_MIN};
use crate::domain::invite::InviteCode;
use crate::domain::notification::{Notification, NotificationFanout, NotificationKind};
use crate::domain::ports::{
    InvitePersistenceError, InviteRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::{DisplayName, Email, User, UserId};
use crate::domain::Error;

/// Raw registration request, validated by [`RegistrationService::register`].
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub invite_code: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Registration use-case: redeem the invite, create the account.
#[derive(Clone)]
pub struct RegistrationService {
    invites: Arc<dyn InviteRepository>,
    users: Arc<dyn UserRepository>,
    fanout: NotificationFanout,
}

fn map_invite_error(error: InvitePersistenceError) -> Error {
    match error {
        InvitePersistenceError::Connection { message } => Error::service_unavailable(message),
        InvitePersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => {
            Error::conflict("email address is already registered")
        }
    }
}

impl RegistrationService {
    /// Assemble the service over its ports.
    pub fn new(
        invites: Arc<dyn InviteRepository>,
        users: Arc<dyn UserRepository>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            invites,
            users,
            fanout,
        }
    }

    /// Register a new account against an invite code.
    ///
    /// The invite determines the role. The use is consumed with a
    /// conditional increment, so two racing registrations on a code's last
    /// use cannot both succeed; the loser sees the same conflict as an
    /// exhausted code.
    pub async fn register(&self, request: RegistrationRequest) -> Result<User, Error> {
        let email = Email::new(&request.email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let display_name = DisplayName::new(request.display_name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if request.password.chars().count() < PASSWORD_MIN {
            return Err(Error::invalid_request(
                CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN }.to_string(),
            ));
        }

        let invite = self.redeemable_invite(&request.invite_code).await?;

        // Cheap duplicate check first; the unique constraint still backstops
        // a race, mapped to the same conflict.
        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(Error::conflict("email address is already registered"));
        }

        if !self
            .invites
            .try_consume(invite.id)
            .await
            .map_err(map_invite_error)?
        {
            return Err(Error::conflict("invite code has no uses remaining"));
        }

        let digest = PasswordDigest::create(&request.password);
        let user = User::new(UserId::random(), email, display_name, invite.role);
        self.users
            .insert(&user, digest.salt_hex(), digest.digest_hex())
            .await
            .map_err(map_user_error)?;

        self.fanout.spawn_dispatch(
            Notification::new(
                user.id,
                NotificationKind::System,
                "Welcome",
                "Your account has been created.",
                None,
            ),
            None,
        );
        Ok(user)
    }

    async fn redeemable_invite(&self, code: &str) -> Result<InviteCode, Error> {
        let invite = self
            .invites
            .find_by_code(code.trim())
            .await
            .map_err(map_invite_error)?
            .ok_or_else(|| Error::not_found("invite code not found"))?;
        invite.check_redeemable(Utc::now())?;
        Ok(invite)
    }
}
