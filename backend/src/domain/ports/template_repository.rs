//! Port abstraction for document template persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::template::DocumentTemplate;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by template repository adapters.
    pub enum TemplatePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "template repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "template repository query failed: {message}",
    }
}

/// Driven port for document template persistence.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Insert a new template.
    async fn insert(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError>;

    /// Persist the current state of an existing template.
    async fn update(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError>;

    /// Delete a template; returns whether it existed.
    async fn delete(&self, id: Uuid) -> Result<bool, TemplatePersistenceError>;

    /// Fetch a template by identifier.
    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<DocumentTemplate>, TemplatePersistenceError>;

    /// List all templates, alphabetically by name.
    async fn list(&self) -> Result<Vec<DocumentTemplate>, TemplatePersistenceError>;
}
