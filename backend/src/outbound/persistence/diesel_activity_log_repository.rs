//! PostgreSQL-backed `ActivityLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::CaseId;
use crate::domain::ports::{ActivityListFilter, ActivityLogError, ActivityLogRepository};
use crate::domain::user::UserId;

use super::diesel_case_repository::clamp_limit;
use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ActivityRow, NewActivityRow};
use super::pool::{DbPool, PoolError};
use super::schema::activity_log;

/// Diesel-backed implementation of the `ActivityLogRepository` port.
#[derive(Clone)]
pub struct DieselActivityLogRepository {
    pool: DbPool,
}

impl DieselActivityLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ActivityLogError {
    map_basic_pool_error(error, ActivityLogError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ActivityLogError {
    map_basic_diesel_error(error, ActivityLogError::query, ActivityLogError::connection)
}

fn row_to_entry(row: ActivityRow) -> ActivityEntry {
    ActivityEntry {
        id: row.id,
        actor_id: UserId::from_uuid(row.actor_id),
        action: row.action,
        case_id: row.case_id.map(CaseId::from_uuid),
        details: row.details,
        recorded_at: row.recorded_at,
    }
}

#[async_trait]
impl ActivityLogRepository for DieselActivityLogRepository {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), ActivityLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewActivityRow {
            id: entry.id,
            actor_id: *entry.actor_id.as_uuid(),
            action: &entry.action,
            case_id: entry.case_id.as_ref().map(|id| *id.as_uuid()),
            details: &entry.details,
            recorded_at: entry.recorded_at,
        };

        diesel::insert_into(activity_log::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        filter: &ActivityListFilter,
    ) -> Result<Vec<ActivityEntry>, ActivityLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = activity_log::table.into_boxed();
        if let Some(case_id) = &filter.case_id {
            query = query.filter(activity_log::case_id.eq(*case_id.as_uuid()));
        }

        let rows: Vec<ActivityRow> = query
            .order(activity_log::recorded_at.desc())
            .limit(clamp_limit(filter.limit))
            .offset(filter.offset.unwrap_or(0).max(0))
            .select(ActivityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}
