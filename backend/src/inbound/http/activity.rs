//! Audit trail endpoint and the admin seed trigger.
//!
//! ```text
//! GET /api/v1/activity?caseId=…&limit=50&offset=0
//! POST /api/v1/admin/seed
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::CaseId;
use crate::domain::ports::{ActivityListFilter, ActivityLogError};
use crate::domain::seed::SeedOutcome;
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityQuery {
    case_id: Option<Uuid>,
    limit: Option<i64>,
    offset: Option<i64>,
}

fn map_activity_error(error: ActivityLogError) -> Error {
    match error {
        ActivityLogError::Connection { message } => Error::service_unavailable(message),
        ActivityLogError::Query { message } => Error::internal(message),
    }
}

/// The audit trail, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/activity",
    params(
        ("caseId" = Option<String>, Query, description = "Restrict to one case"),
        ("limit" = Option<i64>, Query, description = "Page size"),
        ("offset" = Option<i64>, Query, description = "Page offset"),
    ),
    responses(
        (status = 200, description = "Activity entries", body = [ActivityEntry]),
        (status = 403, description = "Admin only"),
    ),
    tags = ["activity"],
    operation_id = "listActivity"
)]
#[get("/activity")]
pub async fn list_activity(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ActivityQuery>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let entries = state
        .activity
        .list(&ActivityListFilter {
            case_id: query.case_id.map(CaseId::from_uuid),
            limit: query.limit,
            offset: query.offset,
        })
        .await
        .map_err(map_activity_error)?;
    Ok(envelope::ok(entries))
}

/// Plant the configured seed batch on demand.
#[utoipa::path(
    post,
    path = "/api/v1/admin/seed",
    responses(
        (status = 200, description = "Seed outcome"),
        (status = 403, description = "Admin only"),
    ),
    tags = ["activity"],
    operation_id = "runSeed"
)]
#[post("/admin/seed")]
pub async fn run_seed(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let outcome = state.seed.run(&state.seed_settings).await?;
    let body = match outcome {
        SeedOutcome::Disabled => json!({ "outcome": "disabled" }),
        SeedOutcome::AlreadyApplied => json!({ "outcome": "already_applied" }),
        SeedOutcome::Applied { records_created } => {
            json!({ "outcome": "applied", "recordsCreated": records_created })
        }
    };
    Ok(envelope::ok(body))
}
