//! Case assignment and transfer endpoints.
//!
//! ```text
//! POST /api/v1/cases/{id}/assign {"agentId":"…"}
//! POST /api/v1/cases/{id}/transfer {"agentId":"…","reason":"workload"}
//! POST /api/v1/cases/{id}/unassign
//! POST /api/v1/cases/bulk-assign {"caseIds":["…"],"agentId":"…"}
//! GET /api/v1/cases/{id}/transfers
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::assignment::{BulkAssignOutcome, TransferRecord};
use crate::domain::case::{Case, CaseId};
use crate::domain::user::UserId;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[schema(value_type = String)]
    pub agent_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    #[schema(value_type = String)]
    pub agent_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignRequest {
    #[schema(value_type = Vec<String>)]
    pub case_ids: Vec<Uuid>,
    #[schema(value_type = String)]
    pub agent_id: Uuid,
}

/// Assign or reassign a case to an agent.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/assign",
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Updated case", body = Case),
        (status = 400, description = "Closed case or ineligible agent"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown case"),
        (status = 409, description = "Already assigned to this agent"),
    ),
    tags = ["assignment"],
    operation_id = "assignCase"
)]
#[post("/cases/{id}/assign")]
pub async fn assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let case = state
        .assignment
        .assign(
            &actor,
            CaseId::from_uuid(path.into_inner()),
            UserId::from_uuid(payload.agent_id),
        )
        .await?;
    Ok(envelope::ok(case))
}

/// Transfer an assigned case to another agent, with a recorded reason.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Updated case", body = Case),
        (status = 400, description = "Unassigned case, empty reason, or ineligible agent"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown case"),
        (status = 409, description = "Already assigned to this agent"),
    ),
    tags = ["assignment"],
    operation_id = "transferCase"
)]
#[post("/cases/{id}/transfer")]
pub async fn transfer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<TransferRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let payload = payload.into_inner();
    let case = state
        .assignment
        .transfer(
            &actor,
            CaseId::from_uuid(path.into_inner()),
            UserId::from_uuid(payload.agent_id),
            payload.reason,
        )
        .await?;
    Ok(envelope::ok(case))
}

/// Clear a case's assignment.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/unassign",
    responses(
        (status = 200, description = "Updated case", body = Case),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown case"),
        (status = 409, description = "Case was not assigned"),
    ),
    tags = ["assignment"],
    operation_id = "unassignCase"
)]
#[post("/cases/{id}/unassign")]
pub async fn unassign(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let case = state
        .assignment
        .unassign(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(case))
}

/// Assign several cases to one agent, reporting per-item outcomes.
#[utoipa::path(
    post,
    path = "/api/v1/cases/bulk-assign",
    request_body = BulkAssignRequest,
    responses(
        (status = 200, description = "Per-item outcomes", body = [BulkAssignOutcome]),
        (status = 400, description = "Ineligible agent"),
        (status = 403, description = "Admin only"),
    ),
    tags = ["assignment"],
    operation_id = "bulkAssignCases"
)]
#[post("/cases/bulk-assign")]
pub async fn bulk_assign(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BulkAssignRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let case_ids: Vec<CaseId> = payload.case_ids.iter().copied().map(CaseId::from_uuid).collect();
    let outcomes = state
        .assignment
        .bulk_assign(&actor, &case_ids, UserId::from_uuid(payload.agent_id))
        .await?;
    Ok(envelope::ok(outcomes))
}

/// Transfer history for a case, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/transfers",
    responses(
        (status = 200, description = "Transfer records", body = [TransferRecord]),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown case"),
    ),
    tags = ["assignment"],
    operation_id = "listCaseTransfers"
)]
#[get("/cases/{id}/transfers")]
pub async fn list_transfers(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let transfers = state
        .assignment
        .transfer_history(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(transfers))
}
