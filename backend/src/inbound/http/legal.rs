//! Versioned legal document endpoints.
//!
//! ```text
//! GET /api/v1/legal/{slug}                 (public)
//! POST /api/v1/legal/{slug} {"title":"…","body":"…"}
//! GET /api/v1/legal/{slug}/versions
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::domain::legal::{validate_slug, LegalDocument};
use crate::domain::ports::LegalPersistenceError;
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PublishRequest {
    pub title: String,
    pub body: String,
}

fn map_legal_error(error: LegalPersistenceError) -> Error {
    match error {
        LegalPersistenceError::Connection { message } => Error::service_unavailable(message),
        LegalPersistenceError::Query { message } => Error::internal(message),
    }
}

/// Latest published version of a document. Public, no session required.
#[utoipa::path(
    get,
    path = "/api/v1/legal/{slug}",
    responses(
        (status = 200, description = "Latest published version", body = LegalDocument),
        (status = 404, description = "No published version"),
    ),
    tags = ["legal"],
    operation_id = "getLegalDocument",
    security([])
)]
#[get("/legal/{slug}")]
pub async fn get_document(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    validate_slug(&slug)?;
    let document = state
        .legal
        .find_latest_published(&slug)
        .await
        .map_err(map_legal_error)?
        .ok_or_else(|| Error::not_found("no published version of this document"))?;
    Ok(envelope::ok(document))
}

/// Publish a new version. History is append-only.
#[utoipa::path(
    post,
    path = "/api/v1/legal/{slug}",
    request_body = PublishRequest,
    responses(
        (status = 201, description = "New version published", body = LegalDocument),
        (status = 400, description = "Invalid slug or empty title"),
        (status = 403, description = "Admin only"),
    ),
    tags = ["legal"],
    operation_id = "publishLegalDocument"
)]
#[post("/legal/{slug}")]
pub async fn publish_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PublishRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let slug = path.into_inner();
    validate_slug(&slug)?;
    if payload.title.trim().is_empty() {
        return Err(Error::invalid_request("title must not be empty"));
    }
    let document = state
        .legal
        .publish(&slug, &payload.title, &payload.body)
        .await
        .map_err(map_legal_error)?;
    Ok(envelope::created(document))
}

/// All versions of a document, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/legal/{slug}/versions",
    responses(
        (status = 200, description = "Versions", body = [LegalDocument]),
        (status = 403, description = "Admin only"),
    ),
    tags = ["legal"],
    operation_id = "listLegalVersions"
)]
#[get("/legal/{slug}/versions")]
pub async fn list_versions(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let slug = path.into_inner();
    validate_slug(&slug)?;
    let versions = state
        .legal
        .list_versions(&slug)
        .await
        .map_err(map_legal_error)?;
    Ok(envelope::ok(versions))
}
