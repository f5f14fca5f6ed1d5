//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::notification::{Notification, NotificationKind};
use crate::domain::ports::{NotificationPersistenceError, NotificationRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationPersistenceError {
    map_basic_pool_error(error, NotificationPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationPersistenceError {
    map_basic_diesel_error(
        error,
        NotificationPersistenceError::query,
        NotificationPersistenceError::connection,
    )
}

fn row_to_notification(
    row: NotificationRow,
) -> Result<Notification, NotificationPersistenceError> {
    let kind = NotificationKind::parse(&row.kind).ok_or_else(|| {
        NotificationPersistenceError::query(format!("unrecognised notification kind: {}", row.kind))
    })?;

    Ok(Notification {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        kind,
        title: row.title,
        body: row.body,
        case_id: row.case_id.map(CaseId::from_uuid),
        read: row.read,
        created_at: row.created_at,
    })
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(
        &self,
        notification: &Notification,
    ) -> Result<(), NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewNotificationRow {
            id: notification.id,
            user_id: *notification.user_id.as_uuid(),
            kind: notification.kind.as_str(),
            title: &notification.title,
            body: &notification.body,
            case_id: notification.case_id.as_ref().map(|id| *id.as_uuid()),
            read: notification.read,
            created_at: notification.created_at,
        };

        diesel::insert_into(notifications::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read.eq(false));
        }

        let rows: Vec<NotificationRow> = query
            .order(notifications::created_at.desc())
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_notification).collect()
    }

    async fn mark_read(
        &self,
        id: Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            notifications::table.filter(
                notifications::id
                    .eq(id)
                    .and(notifications::user_id.eq(user_id.as_uuid())),
            ),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            notifications::table.filter(
                notifications::user_id
                    .eq(user_id.as_uuid())
                    .and(notifications::read.eq(false)),
            ),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated as u64)
    }
}
