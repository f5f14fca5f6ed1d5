//! Diesel-backed `LoginService` adapter.
//!
//! Looks up the stored credential row by normalised email and verifies the
//! salted digest. Unknown email and wrong password both produce the same
//! unauthorized error so responses do not reveal which accounts exist.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::auth::{LoginCredentials, PasswordDigest};
use crate::domain::ports::LoginService;
use crate::domain::user::{User, UserStatus};
use crate::domain::Error;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_user_repository::row_to_user;
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> Error {
    map_basic_pool_error(error, Error::service_unavailable)
}

fn map_diesel_error(error: diesel::result::Error) -> Error {
    map_basic_diesel_error(error, Error::internal, Error::service_unavailable)
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(credentials.email().as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Err(Error::unauthorized("invalid email or password"));
        };

        let digest = PasswordDigest::from_stored(row.salt_hex.clone(), row.digest_hex.clone());
        if !digest.verify(credentials.password()) {
            return Err(Error::unauthorized("invalid email or password"));
        }

        let user = row_to_user(row).map_err(|err| Error::internal(err.to_string()))?;
        if user.status == UserStatus::Suspended {
            return Err(Error::forbidden("account is suspended"));
        }

        Ok(user)
    }
}
