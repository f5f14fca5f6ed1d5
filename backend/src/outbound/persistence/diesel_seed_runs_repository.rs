//! PostgreSQL-backed `SeedRunsRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SeedRun, SeedRunsError, SeedRunsRepository};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewSeedRunRow, SeedRunRow};
use super::pool::{DbPool, PoolError};
use super::schema::seed_runs;

/// Diesel-backed implementation of the `SeedRunsRepository` port.
#[derive(Clone)]
pub struct DieselSeedRunsRepository {
    pool: DbPool,
}

impl DieselSeedRunsRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> SeedRunsError {
    map_basic_pool_error(error, SeedRunsError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> SeedRunsError {
    map_basic_diesel_error(error, SeedRunsError::query, SeedRunsError::connection)
}

fn row_to_run(row: SeedRunRow) -> SeedRun {
    SeedRun {
        seed_name: row.seed_name,
        records_created: row.records_created.max(0) as u64,
        applied_at: row.applied_at,
    }
}

#[async_trait]
impl SeedRunsRepository for DieselSeedRunsRepository {
    async fn find(&self, seed_name: &str) -> Result<Option<SeedRun>, SeedRunsError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = seed_runs::table
            .filter(seed_runs::seed_name.eq(seed_name))
            .select(SeedRunRow::as_select())
            .first::<SeedRunRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_run))
    }

    async fn record(&self, run: &SeedRun) -> Result<(), SeedRunsError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewSeedRunRow {
            seed_name: &run.seed_name,
            records_created: run.records_created.min(i64::MAX as u64) as i64,
            applied_at: run.applied_at,
        };

        diesel::insert_into(seed_runs::table)
            .values(&new_row)
            .on_conflict(seed_runs::seed_name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
