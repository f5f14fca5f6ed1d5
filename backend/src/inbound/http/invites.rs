//! Invite code administration endpoints.
//!
//! ```text
//! POST /api/v1/invites {"role":"agent","maxUses":5,"expiresAt":"…"}
//! GET /api/v1/invites
//! DELETE /api/v1/invites/{id}
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::invite::InviteCode;
use crate::domain::ports::InvitePersistenceError;
use crate::domain::user::Role;
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInviteRequest {
    pub role: Role,
    pub max_uses: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

fn map_invite_error(error: InvitePersistenceError) -> Error {
    match error {
        InvitePersistenceError::Connection { message } => Error::service_unavailable(message),
        InvitePersistenceError::Query { message } => Error::internal(message),
    }
}

/// Mint a new invite code.
#[utoipa::path(
    post,
    path = "/api/v1/invites",
    request_body = CreateInviteRequest,
    responses(
        (status = 201, description = "Invite created", body = InviteCode),
        (status = 400, description = "Zero max uses"),
        (status = 403, description = "Admin only"),
    ),
    tags = ["invites"],
    operation_id = "createInvite"
)]
#[post("/invites")]
pub async fn create_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateInviteRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;

    let mut rng = StdRng::from_entropy();
    let invite = InviteCode::generate(
        &mut rng,
        payload.role,
        payload.max_uses,
        payload.expires_at,
        actor.id,
    )?;
    state
        .invites
        .insert(&invite)
        .await
        .map_err(map_invite_error)?;
    Ok(envelope::created(invite))
}

/// All invites, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/invites",
    responses(
        (status = 200, description = "Invites", body = [InviteCode]),
        (status = 403, description = "Admin only"),
    ),
    tags = ["invites"],
    operation_id = "listInvites"
)]
#[get("/invites")]
pub async fn list_invites(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let invites = state.invites.list().await.map_err(map_invite_error)?;
    Ok(envelope::ok(invites))
}

/// Revoke an invite. The record survives for auditability.
#[utoipa::path(
    delete,
    path = "/api/v1/invites/{id}",
    responses(
        (status = 200, description = "Invite revoked"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Unknown invite"),
    ),
    tags = ["invites"],
    operation_id = "revokeInvite"
)]
#[delete("/invites/{id}")]
pub async fn revoke_invite(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;
    let revoked = state
        .invites
        .revoke(path.into_inner())
        .await
        .map_err(map_invite_error)?;
    if !revoked {
        return Err(Error::not_found("invite not found"));
    }
    Ok(envelope::ok(json!({ "revoked": true })))
}
