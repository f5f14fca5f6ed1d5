//! Document template endpoints.
//!
//! ```text
//! POST /api/v1/templates {"name":"…","description":"…","body":"Dear {{clientName}}, …"}
//! GET /api/v1/templates
//! GET /api/v1/templates/{id}
//! PUT /api/v1/templates/{id} {"name":"…","description":"…","body":"…"}
//! DELETE /api/v1/templates/{id}
//! POST /api/v1/templates/{id}/render {"values":{"clientName":"Ada"}}
//! ```

use std::collections::BTreeMap;

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::TemplatePersistenceError;
use crate::domain::template::DocumentTemplate;
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin, require_staff};
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub body: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RenderRequest {
    pub values: BTreeMap<String, String>,
}

fn map_template_error(error: TemplatePersistenceError) -> Error {
    match error {
        TemplatePersistenceError::Connection { message } => Error::service_unavailable(message),
        TemplatePersistenceError::Query { message } => Error::internal(message),
    }
}

async fn load_template(state: &HttpState, id: Uuid) -> ApiResult<DocumentTemplate> {
    state
        .templates
        .find_by_id(id)
        .await
        .map_err(map_template_error)?
        .ok_or_else(|| Error::not_found("template not found"))
}

/// Create a template. Placeholders are extracted from the body on save.
#[utoipa::path(
    post,
    path = "/api/v1/templates",
    request_body = TemplateRequest,
    responses(
        (status = 201, description = "Template created", body = DocumentTemplate),
        (status = 403, description = "Admin only"),
    ),
    tags = ["templates"],
    operation_id = "createTemplate"
)]
#[post("/templates")]
pub async fn create_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TemplateRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let payload = payload.into_inner();
    let template =
        DocumentTemplate::new(payload.name, payload.description, payload.body, actor.id)?;
    state
        .templates
        .insert(&template)
        .await
        .map_err(map_template_error)?;
    Ok(envelope::created(template))
}

/// List templates. Staff only.
#[utoipa::path(
    get,
    path = "/api/v1/templates",
    responses(
        (status = 200, description = "Templates", body = [DocumentTemplate]),
        (status = 403, description = "Staff only"),
    ),
    tags = ["templates"],
    operation_id = "listTemplates"
)]
#[get("/templates")]
pub async fn list_templates(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_staff(&actor)?;
    let templates = state.templates.list().await.map_err(map_template_error)?;
    Ok(envelope::ok(templates))
}

/// Fetch one template. Staff only.
#[utoipa::path(
    get,
    path = "/api/v1/templates/{id}",
    responses(
        (status = 200, description = "Template", body = DocumentTemplate),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown template"),
    ),
    tags = ["templates"],
    operation_id = "getTemplate"
)]
#[get("/templates/{id}")]
pub async fn get_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_staff(&actor)?;
    let template = load_template(&state, path.into_inner()).await?;
    Ok(envelope::ok(template))
}

/// Replace a template's content.
#[utoipa::path(
    put,
    path = "/api/v1/templates/{id}",
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Updated template", body = DocumentTemplate),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown template"),
    ),
    tags = ["templates"],
    operation_id = "updateTemplate"
)]
#[put("/templates/{id}")]
pub async fn update_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<TemplateRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let mut template = load_template(&state, path.into_inner()).await?;
    let payload = payload.into_inner();
    if payload.name.trim().is_empty() {
        return Err(Error::invalid_request("template name must not be empty"));
    }
    template.name = payload.name;
    template.description = payload.description;
    template.update_body(payload.body);
    state
        .templates
        .update(&template)
        .await
        .map_err(map_template_error)?;
    Ok(envelope::ok(template))
}

/// Delete a template.
#[utoipa::path(
    delete,
    path = "/api/v1/templates/{id}",
    responses(
        (status = 200, description = "Template deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown template"),
    ),
    tags = ["templates"],
    operation_id = "deleteTemplate"
)]
#[delete("/templates/{id}")]
pub async fn delete_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let deleted = state
        .templates
        .delete(path.into_inner())
        .await
        .map_err(map_template_error)?;
    if !deleted {
        return Err(Error::not_found("template not found"));
    }
    Ok(envelope::ok(json!({ "deleted": true })))
}

/// Substitute values into a template body.
#[utoipa::path(
    post,
    path = "/api/v1/templates/{id}/render",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Rendered document"),
        (status = 400, description = "Missing placeholder values"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown template"),
    ),
    tags = ["templates"],
    operation_id = "renderTemplate"
)]
#[post("/templates/{id}/render")]
pub async fn render_template(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<RenderRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_staff(&actor)?;
    let template = load_template(&state, path.into_inner()).await?;
    let rendered = template.render(&payload.values)?;
    Ok(envelope::ok(json!({ "rendered": rendered })))
}
