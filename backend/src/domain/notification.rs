//! In-app notifications and the best-effort fan-out service.
//!
//! The primary database write always commits first; realtime push and email
//! delivery run afterwards as fire-and-forget work whose failures are logged
//! and never surfaced to the caller.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::ports::{Mailer, NotificationRepository, OutboundEmail, RealtimeNotifier};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Category of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CaseAssigned,
    CaseTransferred,
    CaseStatusChanged,
    NewMessage,
    PaymentUpdate,
    System,
}

impl NotificationKind {
    /// Stable snake_case name used in persistence and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CaseAssigned => "case_assigned",
            Self::CaseTransferred => "case_transferred",
            Self::CaseStatusChanged => "case_status_changed",
            Self::NewMessage => "new_message",
            Self::PaymentUpdate => "payment_update",
            Self::System => "system",
        }
    }

    /// Parse the persisted snake_case representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "case_assigned" => Some(Self::CaseAssigned),
            "case_transferred" => Some(Self::CaseTransferred),
            "case_status_changed" => Some(Self::CaseStatusChanged),
            "new_message" => Some(Self::NewMessage),
            "payment_update" => Some(Self::PaymentUpdate),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A push-style in-app alert stored per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub case_id: Option<CaseId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a new unread notification.
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        case_id: Option<CaseId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            case_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Stores notification rows and pushes them to the delivery channels.
#[derive(Clone)]
pub struct NotificationFanout {
    repository: Arc<dyn NotificationRepository>,
    realtime: Arc<dyn RealtimeNotifier>,
    mailer: Arc<dyn Mailer>,
}

impl NotificationFanout {
    /// Assemble the fan-out over its delivery ports.
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        realtime: Arc<dyn RealtimeNotifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            repository,
            realtime,
            mailer,
        }
    }

    /// Store and deliver a notification, logging channel failures.
    ///
    /// The stored row is the source of truth; a realtime or mail failure
    /// downgrades to a warning because delivery is best effort by contract.
    pub async fn dispatch(&self, notification: Notification, email: Option<OutboundEmail>) {
        if let Err(error) = self.repository.insert(&notification).await {
            warn!(
                user_id = %notification.user_id,
                kind = %notification.kind,
                %error,
                "failed to store notification",
            );
            return;
        }
        if let Err(error) = self.realtime.push(&notification).await {
            warn!(
                user_id = %notification.user_id,
                kind = %notification.kind,
                %error,
                "realtime notification push failed",
            );
        }
        if let Some(email) = email {
            if let Err(error) = self.mailer.send(&email).await {
                warn!(to = %email.to, %error, "notification email failed");
            }
        }
    }

    /// Dispatch on a background task after the primary write has committed.
    pub fn spawn_dispatch(&self, notification: Notification, email: Option<OutboundEmail>) {
        let fanout = self.clone();
        tokio::spawn(async move {
            fanout.dispatch(notification, email).await;
        });
    }

    /// Store a notification synchronously, surfacing the error.
    ///
    /// Used where the notification *is* the primary write, such as the
    /// inbound email webhook falling back to a system notification.
    pub async fn store(&self, notification: &Notification) -> Result<(), Error> {
        self.repository
            .insert(notification)
            .await
            .map_err(|error| Error::internal(format!("failed to store notification: {error}")))
    }
}
