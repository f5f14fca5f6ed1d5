//! PostgreSQL-backed `TemplateRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TemplatePersistenceError, TemplateRepository};
use crate::domain::template::DocumentTemplate;
use crate::domain::user::UserId;

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DocumentTemplateRow, DocumentTemplateUpdate, NewDocumentTemplateRow};
use super::pool::{DbPool, PoolError};
use super::schema::document_templates;

/// Diesel-backed implementation of the `TemplateRepository` port.
#[derive(Clone)]
pub struct DieselTemplateRepository {
    pool: DbPool,
}

impl DieselTemplateRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TemplatePersistenceError {
    map_basic_pool_error(error, TemplatePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TemplatePersistenceError {
    map_basic_diesel_error(
        error,
        TemplatePersistenceError::query,
        TemplatePersistenceError::connection,
    )
}

fn row_to_template(row: DocumentTemplateRow) -> DocumentTemplate {
    DocumentTemplate {
        id: row.id,
        name: row.name,
        description: row.description,
        body: row.body,
        placeholders: row.placeholders,
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl TemplateRepository for DieselTemplateRepository {
    async fn insert(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewDocumentTemplateRow {
            id: template.id,
            name: &template.name,
            description: &template.description,
            body: &template.body,
            placeholders: &template.placeholders,
            created_by: *template.created_by.as_uuid(),
            created_at: template.created_at,
            updated_at: template.updated_at,
        };

        diesel::insert_into(document_templates::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = DocumentTemplateUpdate {
            name: &template.name,
            description: &template.description,
            body: &template.body,
            placeholders: &template.placeholders,
            updated_at: template.updated_at,
        };

        diesel::update(document_templates::table.filter(document_templates::id.eq(template.id)))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TemplatePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(document_templates::table.filter(document_templates::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<DocumentTemplate>, TemplatePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = document_templates::table
            .filter(document_templates::id.eq(id))
            .select(DocumentTemplateRow::as_select())
            .first::<DocumentTemplateRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_template))
    }

    async fn list(&self) -> Result<Vec<DocumentTemplate>, TemplatePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<DocumentTemplateRow> = document_templates::table
            .order(document_templates::name.asc())
            .select(DocumentTemplateRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_template).collect())
    }
}
