//! PostgreSQL-backed `TransferLogRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::assignment::TransferRecord;
use crate::domain::case::CaseId;
use crate::domain::ports::{TransferLogError, TransferLogRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewTransferRow, TransferRow};
use super::pool::{DbPool, PoolError};
use super::schema::transfer_history;

/// Diesel-backed implementation of the `TransferLogRepository` port.
#[derive(Clone)]
pub struct DieselTransferLogRepository {
    pool: DbPool,
}

impl DieselTransferLogRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TransferLogError {
    map_basic_pool_error(error, TransferLogError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TransferLogError {
    map_basic_diesel_error(error, TransferLogError::query, TransferLogError::connection)
}

fn row_to_transfer(row: TransferRow) -> TransferRecord {
    TransferRecord {
        id: row.id,
        case_id: CaseId::from_uuid(row.case_id),
        from_agent_id: UserId::from_uuid(row.from_agent_id),
        to_agent_id: UserId::from_uuid(row.to_agent_id),
        reason: row.reason,
        transferred_by: UserId::from_uuid(row.transferred_by),
        transferred_at: row.transferred_at,
    }
}

#[async_trait]
impl TransferLogRepository for DieselTransferLogRepository {
    async fn record(&self, transfer: &TransferRecord) -> Result<(), TransferLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewTransferRow {
            id: transfer.id,
            case_id: *transfer.case_id.as_uuid(),
            from_agent_id: *transfer.from_agent_id.as_uuid(),
            to_agent_id: *transfer.to_agent_id.as_uuid(),
            reason: &transfer.reason,
            transferred_by: *transfer.transferred_by.as_uuid(),
            transferred_at: transfer.transferred_at,
        };

        diesel::insert_into(transfer_history::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TransferRecord>, TransferLogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<TransferRow> = transfer_history::table
            .filter(transfer_history::case_id.eq(case_id.as_uuid()))
            .order(transfer_history::transferred_at.desc())
            .select(TransferRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_transfer).collect())
    }
}
