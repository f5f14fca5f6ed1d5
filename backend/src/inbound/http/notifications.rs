//! Notification inbox endpoints.
//!
//! ```text
//! GET /api/v1/notifications?unread=true
//! POST /api/v1/notifications/{id}/read
//! POST /api/v1/notifications/read-all
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::domain::ports::NotificationPersistenceError;
use crate::domain::Error;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::envelope;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ListNotificationsQuery {
    #[serde(default)]
    unread: bool,
}

fn map_notification_error(error: NotificationPersistenceError) -> Error {
    match error {
        NotificationPersistenceError::Connection { message } => {
            Error::service_unavailable(message)
        }
        NotificationPersistenceError::Query { message } => Error::internal(message),
    }
}

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(("unread" = Option<bool>, Query, description = "Only unread notifications")),
    responses((status = 200, description = "Notifications", body = [Notification])),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ListNotificationsQuery>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let notifications = state
        .notifications
        .list_for_user(&actor.id, query.unread)
        .await
        .map_err(map_notification_error)?;
    Ok(envelope::ok(notifications))
}

/// Mark one of the caller's notifications read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    responses(
        (status = 200, description = "Marked read"),
        (status = 404, description = "Not the caller's notification"),
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let marked = state
        .notifications
        .mark_read(path.into_inner(), &actor.id)
        .await
        .map_err(map_notification_error)?;
    if !marked {
        // Someone else's notification reads the same as a missing one.
        return Err(Error::not_found("notification not found"));
    }
    Ok(envelope::ok(json!({ "read": true })))
}

/// Mark all the caller's notifications read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses((status = 200, description = "Number of notifications marked")),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let updated = state
        .notifications
        .mark_all_read(&actor.id)
        .await
        .map_err(map_notification_error)?;
    Ok(envelope::ok(json!({ "updated": updated })))
}
