//! PostgreSQL-backed `LegalDocumentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::legal::LegalDocument;
use crate::domain::ports::{LegalDocumentRepository, LegalPersistenceError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{LegalDocumentRow, NewLegalDocumentRow};
use super::pool::{DbPool, PoolError};
use super::schema::legal_documents;

/// Diesel-backed implementation of the `LegalDocumentRepository` port.
#[derive(Clone)]
pub struct DieselLegalRepository {
    pool: DbPool,
}

impl DieselLegalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> LegalPersistenceError {
    map_basic_pool_error(error, LegalPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> LegalPersistenceError {
    map_basic_diesel_error(
        error,
        LegalPersistenceError::query,
        LegalPersistenceError::connection,
    )
}

fn row_to_document(row: LegalDocumentRow) -> LegalDocument {
    LegalDocument {
        id: row.id,
        slug: row.slug,
        version: row.version.max(0) as u32,
        title: row.title,
        body: row.body,
        published: row.published,
        created_at: row.created_at,
    }
}

#[async_trait]
impl LegalDocumentRepository for DieselLegalRepository {
    async fn find_latest_published(
        &self,
        slug: &str,
    ) -> Result<Option<LegalDocument>, LegalPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = legal_documents::table
            .filter(
                legal_documents::slug
                    .eq(slug)
                    .and(legal_documents::published.eq(true)),
            )
            .order(legal_documents::version.desc())
            .select(LegalDocumentRow::as_select())
            .first::<LegalDocumentRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_document))
    }

    async fn list_versions(
        &self,
        slug: &str,
    ) -> Result<Vec<LegalDocument>, LegalPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<LegalDocumentRow> = legal_documents::table
            .filter(legal_documents::slug.eq(slug))
            .order(legal_documents::version.desc())
            .select(LegalDocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_document).collect())
    }

    async fn publish(
        &self,
        slug: &str,
        title: &str,
        body: &str,
    ) -> Result<LegalDocument, LegalPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let current: Option<i32> = legal_documents::table
            .filter(legal_documents::slug.eq(slug))
            .select(diesel::dsl::max(legal_documents::version))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let new_row = NewLegalDocumentRow {
            id: Uuid::new_v4(),
            slug,
            version: current.unwrap_or(0) + 1,
            title,
            body,
            published: true,
            created_at: Utc::now(),
        };

        let row = diesel::insert_into(legal_documents::table)
            .values(&new_row)
            .returning(LegalDocumentRow::as_returning())
            .get_result::<LegalDocumentRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_document(row))
    }
}
