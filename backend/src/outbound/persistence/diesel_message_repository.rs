//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::case::CaseId;
use crate::domain::message::CaseMessage;
use crate::domain::ports::{MessagePersistenceError, MessageRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CaseMessageRow, NewCaseMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::case_messages;

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessagePersistenceError {
    map_basic_pool_error(error, MessagePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessagePersistenceError {
    map_basic_diesel_error(
        error,
        MessagePersistenceError::query,
        MessagePersistenceError::connection,
    )
}

fn row_to_message(row: CaseMessageRow) -> CaseMessage {
    CaseMessage {
        id: row.id,
        case_id: CaseId::from_uuid(row.case_id),
        sender_id: UserId::from_uuid(row.sender_id),
        body: row.body,
        sent_at: row.sent_at,
        read_at: row.read_at,
    }
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn insert(&self, message: &CaseMessage) -> Result<(), MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCaseMessageRow {
            id: message.id,
            case_id: *message.case_id.as_uuid(),
            sender_id: *message.sender_id.as_uuid(),
            body: &message.body,
            sent_at: message.sent_at,
            read_at: message.read_at,
        };

        diesel::insert_into(case_messages::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<CaseMessage>, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CaseMessageRow> = case_messages::table
            .filter(case_messages::case_id.eq(case_id.as_uuid()))
            .order(case_messages::sent_at.asc())
            .select(CaseMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_message).collect())
    }

    async fn mark_read(
        &self,
        case_id: &CaseId,
        reader: &UserId,
    ) -> Result<u64, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            case_messages::table.filter(
                case_messages::case_id
                    .eq(case_id.as_uuid())
                    .and(case_messages::sender_id.ne(reader.as_uuid()))
                    .and(case_messages::read_at.is_null()),
            ),
        )
        .set(case_messages::read_at.eq(Utc::now()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(updated as u64)
    }
}
