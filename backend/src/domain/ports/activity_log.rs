//! Port abstraction for the audit trail.

use async_trait::async_trait;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::CaseId;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by activity log adapters.
    pub enum ActivityLogError {
        /// Repository connection could not be established.
        Connection { message: String } => "activity log connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "activity log query failed: {message}",
    }
}

/// Listing filter for the audit trail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityListFilter {
    /// Restrict to entries for one case.
    pub case_id: Option<CaseId>,
    /// Page size; adapters clamp to a sane maximum.
    pub limit: Option<i64>,
    /// Page offset.
    pub offset: Option<i64>,
}

/// Driven port for the audit trail.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an entry.
    async fn record(&self, entry: &ActivityEntry) -> Result<(), ActivityLogError>;

    /// List entries matching the filter, newest first.
    async fn list(
        &self,
        filter: &ActivityListFilter,
    ) -> Result<Vec<ActivityEntry>, ActivityLogError>;
}
