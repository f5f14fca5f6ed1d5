//! Reqwest-backed file storage adapter.
//!
//! The browser uploads avatars straight to the hosted upload provider; the
//! backend only deletes files it no longer references, so this adapter is a
//! single authenticated DELETE.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use crate::domain::ports::{FileStorage, StorageError};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// File storage adapter that deletes provider-hosted files by URL.
pub struct HttpFileStorage {
    client: Client,
    api_key: String,
}

impl HttpFileStorage {
    /// Build an adapter authenticating with the given API key.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl FileStorage for HttpFileStorage {
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let target = Url::parse(url)
            .map_err(|err| StorageError::provider(format!("invalid file url: {err}")))?;

        let response = self
            .client
            .delete(target)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|err| StorageError::provider(err.to_string()))?;

        let status = response.status();
        // A file that is already gone is a successful delete.
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(StorageError::provider(format!(
            "storage provider returned {status}"
        )))
    }
}
