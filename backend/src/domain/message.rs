//! Case-scoped messages exchanged between a client and staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::user::UserId;
use crate::domain::Error;

/// Maximum accepted message body length in characters.
pub const MESSAGE_BODY_MAX: usize = 4000;

/// A message posted on a case thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseMessage {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub sender_id: UserId,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl CaseMessage {
    /// Build a new unread message after validating the body.
    pub fn new(case_id: CaseId, sender_id: UserId, body: impl Into<String>) -> Result<Self, Error> {
        let body = body.into();
        validate_body(&body)?;
        Ok(Self {
            id: Uuid::new_v4(),
            case_id,
            sender_id,
            body,
            sent_at: Utc::now(),
            read_at: None,
        })
    }
}

/// Reject empty or oversized message bodies.
pub fn validate_body(body: &str) -> Result<(), Error> {
    if body.trim().is_empty() {
        return Err(Error::invalid_request("message body must not be empty"));
    }
    if body.chars().count() > MESSAGE_BODY_MAX {
        return Err(Error::invalid_request(format!(
            "message body must be at most {MESSAGE_BODY_MAX} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn rejects_blank_body() {
        let err = CaseMessage::new(CaseId::random(), UserId::random(), "  \n ")
            .expect_err("blank body");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn rejects_oversized_body() {
        let body = "x".repeat(MESSAGE_BODY_MAX + 1);
        assert!(CaseMessage::new(CaseId::random(), UserId::random(), body).is_err());
    }

    #[test]
    fn new_messages_start_unread() {
        let message = CaseMessage::new(CaseId::random(), UserId::random(), "hello")
            .expect("valid message");
        assert!(message.read_at.is_none());
    }
}
