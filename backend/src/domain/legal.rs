//! Versioned legal documents (terms of service, privacy policy, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;

/// A published or draft version of a legal document.
///
/// Versions are append-only; `publish` always writes `version = previous + 1`
/// rather than mutating history, so clients can pin the version they accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegalDocument {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(example = "terms")]
    pub slug: String,
    pub version: u32,
    pub title: String,
    pub body: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Validate a document slug: lowercase ascii, digits, and hyphens.
pub fn validate_slug(slug: &str) -> Result<(), Error> {
    let valid = !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::invalid_request(
            "slug must be lowercase letters, digits, or hyphens",
        ))
    }
}
