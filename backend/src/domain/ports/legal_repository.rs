//! Port abstraction for versioned legal document persistence.

use async_trait::async_trait;

use crate::domain::legal::LegalDocument;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by legal document adapters.
    pub enum LegalPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "legal repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "legal repository query failed: {message}",
    }
}

/// Driven port for versioned legal documents.
#[async_trait]
pub trait LegalDocumentRepository: Send + Sync {
    /// Latest published version for the slug, if any.
    async fn find_latest_published(
        &self,
        slug: &str,
    ) -> Result<Option<LegalDocument>, LegalPersistenceError>;

    /// All versions for the slug, newest first.
    async fn list_versions(&self, slug: &str)
        -> Result<Vec<LegalDocument>, LegalPersistenceError>;

    /// Append and publish a new version (`max(version) + 1` for the slug).
    async fn publish(
        &self,
        slug: &str,
        title: &str,
        body: &str,
    ) -> Result<LegalDocument, LegalPersistenceError>;
}
