//! PostgreSQL-backed `CaseRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::case::{Case, CaseId, CasePriority, CaseReference, CaseStatus};
use crate::domain::ports::{CaseListFilter, CasePersistenceError, CaseRepository};
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CaseRow, CaseUpdate, NewCaseRow};
use super::pool::{DbPool, PoolError};
use super::schema::cases;

/// Limit applied when a listing filter does not set one.
const DEFAULT_PAGE_SIZE: i64 = 50;
/// Hard ceiling on page size regardless of what the filter asks for.
const MAX_PAGE_SIZE: i64 = 200;

/// Diesel-backed implementation of the `CaseRepository` port.
#[derive(Clone)]
pub struct DieselCaseRepository {
    pool: DbPool,
}

impl DieselCaseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CasePersistenceError {
    map_basic_pool_error(error, CasePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CasePersistenceError {
    map_basic_diesel_error(
        error,
        CasePersistenceError::query,
        CasePersistenceError::connection,
    )
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Convert a database row to a domain case.
fn row_to_case(row: CaseRow) -> Result<Case, CasePersistenceError> {
    let status = CaseStatus::parse(&row.status).ok_or_else(|| {
        CasePersistenceError::query(format!("unrecognised case status: {}", row.status))
    })?;
    let priority = CasePriority::parse(&row.priority).ok_or_else(|| {
        CasePersistenceError::query(format!("unrecognised case priority: {}", row.priority))
    })?;

    Ok(Case {
        id: CaseId::from_uuid(row.id),
        reference: CaseReference::from_stored(row.reference),
        client_id: UserId::from_uuid(row.client_id),
        assigned_agent_id: row.assigned_agent_id.map(UserId::from_uuid),
        service_type: row.service_type,
        title: row.title,
        details: row.details,
        status,
        priority,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl CaseRepository for DieselCaseRepository {
    async fn insert(&self, case: &Case) -> Result<(), CasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCaseRow {
            id: *case.id.as_uuid(),
            reference: case.reference.as_ref(),
            client_id: *case.client_id.as_uuid(),
            assigned_agent_id: case.assigned_agent_id.as_ref().map(|id| *id.as_uuid()),
            service_type: &case.service_type,
            title: &case.title,
            details: &case.details,
            status: case.status.as_str(),
            priority: case.priority.as_str(),
            created_at: case.created_at,
            updated_at: case.updated_at,
        };

        diesel::insert_into(cases::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, CasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = cases::table
            .filter(cases::id.eq(id.as_uuid()))
            .select(CaseRow::as_select())
            .first::<CaseRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_case).transpose()
    }

    async fn list(&self, filter: &CaseListFilter) -> Result<Vec<Case>, CasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = cases::table.into_boxed();
        if let Some(client_id) = &filter.client_id {
            query = query.filter(cases::client_id.eq(*client_id.as_uuid()));
        }
        if let Some(agent_id) = &filter.assigned_agent_id {
            query = query.filter(cases::assigned_agent_id.eq(*agent_id.as_uuid()));
        }
        if let Some(status) = filter.status {
            query = query.filter(cases::status.eq(status.as_str()));
        }

        let rows: Vec<CaseRow> = query
            .order(cases::updated_at.desc())
            .limit(clamp_limit(filter.limit))
            .offset(filter.offset.unwrap_or(0).max(0))
            .select(CaseRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_case).collect()
    }

    async fn update(&self, case: &Case) -> Result<(), CasePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = CaseUpdate {
            assigned_agent_id: Some(case.assigned_agent_id.as_ref().map(|id| *id.as_uuid())),
            status: case.status.as_str(),
            priority: case.priority.as_str(),
            updated_at: case.updated_at,
        };

        diesel::update(cases::table.filter(cases::id.eq(case.id.as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
