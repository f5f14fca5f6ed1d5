//! Audit trail entries recorded beside case and payment mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::user::UserId;

/// One recorded action: who did what, optionally against which case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub actor_id: UserId,
    /// Snake_case verb, e.g. `case_assigned`, `status_changed`.
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub case_id: Option<CaseId>,
    pub details: Value,
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Build a new entry timestamped now.
    pub fn new(
        actor_id: UserId,
        action: impl Into<String>,
        case_id: Option<CaseId>,
        details: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            action: action.into(),
            case_id,
            details,
            recorded_at: Utc::now(),
        }
    }
}
