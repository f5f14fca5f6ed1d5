//! Avatar finalisation endpoint.
//!
//! The browser uploads to the file provider first, then calls this endpoint
//! to point the profile at the new URL.
//!
//! ```text
//! POST /api/v1/users/me/avatar {"newUrl":"…","previousUrl":"…"}
//! ```

use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeAvatarRequest {
    pub new_url: String,
    /// What the caller believed the avatar was when the upload started.
    #[serde(default)]
    pub previous_url: Option<String>,
}

/// Swap the profile avatar, guarded against concurrent uploads.
#[utoipa::path(
    post,
    path = "/api/v1/users/me/avatar",
    request_body = FinalizeAvatarRequest,
    responses(
        (status = 200, description = "Avatar updated"),
        (status = 400, description = "Empty URL"),
        (status = 409, description = "Avatar changed since the upload started"),
    ),
    tags = ["users"],
    operation_id = "finalizeAvatar"
)]
#[post("/users/me/avatar")]
pub async fn finalize_avatar(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FinalizeAvatarRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    state
        .avatar
        .finalize(actor.id, &payload.new_url, payload.previous_url.as_deref())
        .await?;
    Ok(envelope::ok(json!({ "avatarUrl": payload.new_url })))
}
