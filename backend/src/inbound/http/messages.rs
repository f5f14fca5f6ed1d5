//! Case message thread endpoints.
//!
//! ```text
//! POST /api/v1/cases/{id}/messages {"body":"…"}
//! GET /api/v1/cases/{id}/messages
//! POST /api/v1/cases/{id}/messages/read
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::message::CaseMessage;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PostMessageRequest {
    pub body: String,
}

/// Post a message on a case thread.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/messages",
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message posted", body = CaseMessage),
        (status = 400, description = "Empty or oversized body"),
        (status = 404, description = "Unknown case, or the caller is not a participant"),
    ),
    tags = ["messages"],
    operation_id = "postMessage"
)]
#[post("/cases/{id}/messages")]
pub async fn post_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<PostMessageRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let message = state
        .messages
        .post(
            &actor,
            CaseId::from_uuid(path.into_inner()),
            payload.into_inner().body,
        )
        .await?;
    Ok(envelope::created(message))
}

/// List a case's messages, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/cases/{id}/messages",
    responses(
        (status = 200, description = "Messages", body = [CaseMessage]),
        (status = 404, description = "Unknown case, or the caller is not a participant"),
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/cases/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let messages = state
        .messages
        .list(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(messages))
}

/// Mark the counterpart's messages on a case as read.
#[utoipa::path(
    post,
    path = "/api/v1/cases/{id}/messages/read",
    responses(
        (status = 200, description = "Number of messages marked"),
        (status = 404, description = "Unknown case, or the caller is not a participant"),
    ),
    tags = ["messages"],
    operation_id = "markMessagesRead"
)]
#[post("/cases/{id}/messages/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let updated = state
        .messages
        .mark_read(&actor, CaseId::from_uuid(path.into_inner()))
        .await?;
    Ok(envelope::ok(json!({ "updated": updated })))
}
