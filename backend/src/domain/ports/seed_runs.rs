//! Port abstraction recording applied seed runs for idempotent seeding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by seed run adapters.
    pub enum SeedRunsError {
        /// Repository connection could not be established.
        Connection { message: String } => "seed runs connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "seed runs query failed: {message}",
    }
}

/// One completed seeding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRun {
    /// Name of the deterministic seed that was applied.
    pub seed_name: String,
    /// Number of records the run created.
    pub records_created: u64,
    /// When the run finished.
    pub applied_at: DateTime<Utc>,
}

/// Driven port persisting which seeds have already been applied.
#[async_trait]
pub trait SeedRunsRepository: Send + Sync {
    /// Look up a previous run by seed name.
    async fn find(&self, seed_name: &str) -> Result<Option<SeedRun>, SeedRunsError>;

    /// Record a completed run.
    async fn record(&self, run: &SeedRun) -> Result<(), SeedRunsError>;
}
