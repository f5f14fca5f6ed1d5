//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{DisplayName, Email, Role, User, UserId, UserStatus};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = error {
        return UserPersistenceError::duplicate_email();
    }
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row to a domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = Email::new(row.email)
        .map_err(|err| UserPersistenceError::query(format!("stored email invalid: {err}")))?;
    let display_name = DisplayName::new(row.display_name).map_err(|err| {
        UserPersistenceError::query(format!("stored display name invalid: {err}"))
    })?;
    let role = Role::parse(&row.role)
        .ok_or_else(|| UserPersistenceError::query(format!("unrecognised role: {}", row.role)))?;
    let status = UserStatus::parse(&row.status).ok_or_else(|| {
        UserPersistenceError::query(format!("unrecognised status: {}", row.status))
    })?;

    Ok(User {
        id: UserId::from_uuid(row.id),
        email,
        display_name,
        role,
        status,
        avatar_url: row.avatar_url,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        salt_hex: &str,
        digest_hex: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            display_name: user.display_name.as_ref(),
            role: user.role.as_str(),
            status: user.status.as_str(),
            avatar_url: user.avatar_url.as_deref(),
            salt_hex,
            digest_hex,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = users::table.into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }

        let rows: Vec<UserRow> = query
            .order(users::created_at.desc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::status.eq(status.as_str()),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn count_active_admins(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = users::table
            .filter(
                users::role
                    .eq(Role::Admin.as_str())
                    .and(users::status.eq(UserStatus::Active.as_str())),
            )
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(count.max(0) as u64)
    }

    async fn set_avatar_if_matches(
        &self,
        id: &UserId,
        new_url: Option<&str>,
        expected: Option<&str>,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            users::table.filter(
                users::id
                    .eq(id.as_uuid())
                    .and(users::avatar_url.is_not_distinct_from(expected)),
            ),
        )
        .set((
            users::avatar_url.eq(new_url),
            users::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}
