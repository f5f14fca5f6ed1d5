//! Avatar replacement with an optimistic guard against concurrent uploads.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{FileStorage, UserPersistenceError, UserRepository};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Finalises uploaded avatars against the user record.
#[derive(Clone)]
pub struct AvatarService {
    users: Arc<dyn UserRepository>,
    storage: Arc<dyn FileStorage>,
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => Error::internal("unexpected duplicate email"),
    }
}

impl AvatarService {
    /// Assemble the service over its ports.
    pub fn new(users: Arc<dyn UserRepository>, storage: Arc<dyn FileStorage>) -> Self {
        Self { users, storage }
    }

    /// Point the user's profile at a freshly uploaded avatar.
    ///
    /// The update only lands if the stored avatar still matches what the
    /// caller saw when the upload started. A lost race deletes the fresh
    /// upload and reports a conflict; a won race deletes the replaced file.
    /// Storage deletes are best effort either way.
    pub async fn finalize(
        &self,
        user_id: UserId,
        new_url: &str,
        previous_url: Option<&str>,
    ) -> Result<(), Error> {
        if new_url.trim().is_empty() {
            return Err(Error::invalid_request("avatarUrl must not be empty"));
        }

        let updated = self
            .users
            .set_avatar_if_matches(&user_id, Some(new_url), previous_url)
            .await
            .map_err(map_user_error)?;

        if !updated {
            if let Err(error) = self.storage.delete(new_url).await {
                warn!(%user_id, url = new_url, %error, "failed to delete orphaned avatar");
            }
            return Err(Error::conflict(
                "avatar was changed by another request; re-fetch the profile and retry",
            ));
        }

        if let Some(replaced) = previous_url {
            if let Err(error) = self.storage.delete(replaced).await {
                warn!(%user_id, url = replaced, %error, "failed to delete replaced avatar");
            }
        }
        Ok(())
    }
}
