//! Driven port for the hosted file-upload service.

use async_trait::async_trait;
use tracing::debug;

use super::define_port_error;

define_port_error! {
    /// Errors raised by file storage adapters.
    pub enum StorageError {
        /// The storage endpoint or credentials are not configured.
        NotConfigured => "file storage is not configured",
        /// The storage provider rejected or failed the request.
        Provider { message: String } => "file storage error: {message}",
    }
}

/// Deletes files the application no longer references.
///
/// Uploads happen browser-to-provider; the backend only ever cleans up
/// orphaned or replaced files, so deletion is the whole port.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Delete the file behind the given URL.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Storage used when no provider is configured; logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpFileStorage;

#[async_trait]
impl FileStorage for NoOpFileStorage {
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        debug!(%url, "file delete skipped (no provider configured)");
        Ok(())
    }
}
