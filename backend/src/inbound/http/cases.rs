//! Case lifecycle endpoints.
//!
//! ```text
//! POST /api/v1/cases {"serviceType":"work_visa","title":"…","details":"…"}
//! GET /api/v1/cases?status=under_review&limit=20&offset=0
//! GET /api/v1/cases/{id}
//! PATCH /api/v1/cases/{id}/status {"status":"approved"}
//! ```

use actix_web::{get, patch, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::case::{Case, CaseId, CasePriority, CaseStatus};
use crate::domain::case_service::NewCase;
use crate::domain::Error;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub service_type: String,
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub priority: CasePriority,
}

#[derive(Debug, Deserialize)]
pub struct ListCasesQuery {
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangeStatusRequest {
    pub status: CaseStatus,
}

fn parse_status(raw: &str) -> ApiResult<CaseStatus> {
    CaseStatus::parse(raw)
        .ok_or_else(|| Error::invalid_request(format!("unknown case status: {raw}")))
}

/// Open a new case.
#[utoipa::path(
    post,
    path = "/api/v1/cases",
    request_body = CreateCaseRequest,
    responses(
        (status = 201, description = "Case created", body = Case),
        (status = 400, description = "Missing title or service type"),
        (status = 403, description = "Only clients open cases"),
    ),
    tags = ["cases"],
    operation_id = "createCase"
)]
#[post("/cases")]
pub async fn create_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCaseRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let payload = payload.into_inner();
    let case = state
        .cases
        .create(
            &actor,
            NewCase {
                service_type: payload.service_type,
                title: payload.title,
                details: payload.details,
                priority: payload.priority,
            },
        )
        .await?;
    Ok(envelope::created(case))
}

/// Role-scoped case listing.
#[utoipa::path(
    get,
    path = "/api/v1/cases",
    params(
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset"),
    ),
    responses((status = 200, description = "Cases visible to the caller", body = [Case])),
    tags = ["cases"],
    operation_id = "listCases"
)]
#[get("/cases")]
pub async fn list_cases(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListCasesQuery>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let cases = state
        .cases
        .list(&actor, status, query.limit, query.offset)
        .await?;
    Ok(envelope::ok(cases))
}

/// Fetch one case.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}",
    responses(
        (status = 200, description = "Case", body = Case),
        (status = 404, description = "Unknown case, or the caller may not see it"),
    ),
    tags = ["cases"],
    operation_id = "getCase"
)]
#[get("/cases/{id}")]
pub async fn get_case(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let case = state
        .cases
        .get(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(case))
}

/// Move a case through its lifecycle.
#[utoipa::path(
    patch,
    path = "/api/v1/cases/{id}/status",
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Updated case", body = Case),
        (status = 403, description = "Not the assigned agent or an admin"),
        (status = 404, description = "Unknown case"),
        (status = 409, description = "Illegal lifecycle transition"),
    ),
    tags = ["cases"],
    operation_id = "changeCaseStatus"
)]
#[patch("/cases/{id}/status")]
pub async fn change_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ChangeStatusRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let case = state
        .cases
        .change_status(&actor, CaseId::from_uuid(path.into_inner()), payload.status)
        .await?;
    Ok(envelope::ok(case))
}
