//! PostgreSQL-backed `InviteRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::invite::InviteCode;
use crate::domain::ports::{InvitePersistenceError, InviteRepository};
use crate::domain::user::{Role, UserId};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{InviteCodeRow, NewInviteCodeRow};
use super::pool::{DbPool, PoolError};
use super::schema::invite_codes;

/// Diesel-backed implementation of the `InviteRepository` port.
#[derive(Clone)]
pub struct DieselInviteRepository {
    pool: DbPool,
}

impl DieselInviteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InvitePersistenceError {
    map_basic_pool_error(error, InvitePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> InvitePersistenceError {
    map_basic_diesel_error(
        error,
        InvitePersistenceError::query,
        InvitePersistenceError::connection,
    )
}

fn row_to_invite(row: InviteCodeRow) -> Result<InviteCode, InvitePersistenceError> {
    let role = Role::parse(&row.role).ok_or_else(|| {
        InvitePersistenceError::query(format!("unrecognised invite role: {}", row.role))
    })?;

    Ok(InviteCode {
        id: row.id,
        code: row.code,
        role,
        max_uses: row.max_uses.max(0) as u32,
        used_count: row.used_count.max(0) as u32,
        expires_at: row.expires_at,
        revoked: row.revoked,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
    })
}

#[async_trait]
impl InviteRepository for DieselInviteRepository {
    async fn insert(&self, invite: &InviteCode) -> Result<(), InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewInviteCodeRow {
            id: invite.id,
            code: &invite.code,
            role: invite.role.as_str(),
            max_uses: invite.max_uses.min(i32::MAX as u32) as i32,
            used_count: invite.used_count.min(i32::MAX as u32) as i32,
            expires_at: invite.expires_at,
            revoked: invite.revoked,
            created_by: *invite.created_by.as_uuid(),
            created_at: invite.created_at,
        };

        diesel::insert_into(invite_codes::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<InviteCode>, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<InviteCodeRow> = invite_codes::table
            .order(invite_codes::created_at.desc())
            .select(InviteCodeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_invite).collect()
    }

    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InviteCode>, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = invite_codes::table
            .filter(invite_codes::code.eq(code))
            .select(InviteCodeRow::as_select())
            .first::<InviteCodeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_invite).transpose()
    }

    async fn revoke(&self, id: Uuid) -> Result<bool, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(invite_codes::table.filter(invite_codes::id.eq(id)))
            .set(invite_codes::revoked.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn try_consume(&self, id: Uuid) -> Result<bool, InvitePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // The guard lives in the WHERE clause so concurrent registrations
        // cannot push used_count past max_uses.
        let updated = diesel::update(
            invite_codes::table.filter(
                invite_codes::id
                    .eq(id)
                    .and(invite_codes::revoked.eq(false))
                    .and(invite_codes::used_count.lt(invite_codes::max_uses)),
            ),
        )
        .set(invite_codes::used_count.eq(invite_codes::used_count + 1))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}
