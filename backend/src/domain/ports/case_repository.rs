//! Port abstraction for case persistence adapters.

use async_trait::async_trait;

use crate::domain::case::{Case, CaseId, CaseStatus};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by case repository adapters.
    pub enum CasePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "case repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "case repository query failed: {message}",
    }
}

/// Role-scoped listing filter; `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseListFilter {
    /// Restrict to cases owned by this client.
    pub client_id: Option<UserId>,
    /// Restrict to cases assigned to this agent.
    pub assigned_agent_id: Option<UserId>,
    /// Restrict to a single lifecycle status.
    pub status: Option<CaseStatus>,
    /// Page size; adapters clamp to a sane maximum.
    pub limit: Option<i64>,
    /// Page offset.
    pub offset: Option<i64>,
}

/// Driven port for case persistence.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Insert a new case.
    async fn insert(&self, case: &Case) -> Result<(), CasePersistenceError>;

    /// Fetch a case by identifier.
    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, CasePersistenceError>;

    /// List cases matching the filter, most recently updated first.
    async fn list(&self, filter: &CaseListFilter) -> Result<Vec<Case>, CasePersistenceError>;

    /// Persist the current state of an existing case.
    async fn update(&self, case: &Case) -> Result<(), CasePersistenceError>;
}
