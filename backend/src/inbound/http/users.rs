//! User directory and account management endpoints.
//!
//! ```text
//! GET /api/v1/users/me
//! GET /api/v1/users?role=client
//! PATCH /api/v1/users/{id}/status {"status":"suspended"}
//! ```

use actix_web::{get, patch, web, HttpResponse};
use serde::Deserialize;

use crate::domain::ports::UserPersistenceError;
use crate::domain::user::{Role, User, UserId, UserStatus};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin, require_staff};
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    role: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateStatusRequest {
    pub status: UserStatus,
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => Error::internal("unexpected duplicate email"),
    }
}

/// Current profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not logged in"),
    ),
    tags = ["users"],
    operation_id = "me"
)]
#[get("/users/me")]
pub async fn me(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    Ok(envelope::ok(user))
}

/// Staff directory listing.
///
/// Admins may list any role; agents only see clients, which is what the
/// case screens need.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(("role" = Option<String>, Query, description = "Filter by role")),
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Client access denied"),
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListUsersQuery>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_staff(&actor)?;

    let role = match query.role.as_deref() {
        Some(raw) => Some(
            Role::parse(raw)
                .ok_or_else(|| Error::invalid_request(format!("unknown role: {raw}")))?,
        ),
        None => None,
    };
    let role = if actor.role == Role::Agent {
        // Agents only see the client directory regardless of the filter.
        Some(Role::Client)
    } else {
        role
    };

    let users = state.users.list(role).await.map_err(map_user_error)?;
    Ok(envelope::ok(users))
}

/// Suspend or reactivate an account.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/status",
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No such user"),
        (status = 409, description = "Would suspend the last active admin"),
    ),
    tags = ["users"],
    operation_id = "updateUserStatus"
)]
#[patch("/users/{id}/status")]
pub async fn update_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<uuid::Uuid>,
    payload: web::Json<UpdateStatusRequest>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    require_admin(&actor)?;

    let target = UserId::from_uuid(path.into_inner());
    if payload.status == UserStatus::Suspended {
        let existing = state
            .users
            .find_by_id(&target)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;
        // The system must always keep one admin who can log in.
        if existing.role == Role::Admin
            && existing.is_active()
            && state
                .users
                .count_active_admins()
                .await
                .map_err(map_user_error)?
                <= 1
        {
            return Err(Error::conflict("cannot suspend the last active admin"));
        }
    }

    let updated = state
        .users
        .update_status(&target, payload.status)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(envelope::ok(updated))
}
