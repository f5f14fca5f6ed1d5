//! Case aggregate: the immigration service request and its status lifecycle.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::user::UserId;
use crate::domain::{Error, ErrorCode};

/// Stable case identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CaseId(Uuid);

impl CaseId {
    /// Wrap an already-parsed UUID.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random [`CaseId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const REFERENCE_PREFIX: &str = "VF-";
const REFERENCE_SUFFIX_LEN: usize = 8;
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Human-facing case reference, e.g. `VF-K7M2P9QX`.
///
/// The alphabet omits easily-confused characters (0/O, 1/I) because agents
/// read these out over the phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct CaseReference(String);

impl CaseReference {
    /// Generate a fresh reference from the supplied RNG.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let suffix: String = (0..REFERENCE_SUFFIX_LEN)
            .map(|_| {
                let idx = rng.gen_range(0..REFERENCE_ALPHABET.len());
                char::from(REFERENCE_ALPHABET[idx])
            })
            .collect();
        Self(format!("{REFERENCE_PREFIX}{suffix}"))
    }

    /// Accept a stored reference without re-validating the alphabet.
    ///
    /// Persistence is the source of truth for historical references, which
    /// may predate alphabet changes.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for CaseReference {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CaseReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Lifecycle status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Submitted,
    UnderReview,
    AdditionalInfoRequired,
    Approved,
    Rejected,
    Closed,
}

impl CaseStatus {
    /// Stable snake_case name used in persistence and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::AdditionalInfoRequired => "additional_info_required",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }

    /// Parse the persisted snake_case representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "submitted" => Some(Self::Submitted),
            "under_review" => Some(Self::UnderReview),
            "additional_info_required" => Some(Self::AdditionalInfoRequired),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Whether the lifecycle permits moving from `self` to `next`.
    ///
    /// `Closed` is terminal; `Approved` and `Rejected` may only close.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Submitted, Self::UnderReview)
                | (Self::UnderReview, Self::AdditionalInfoRequired)
                | (Self::UnderReview, Self::Approved)
                | (Self::UnderReview, Self::Rejected)
                | (Self::AdditionalInfoRequired, Self::UnderReview)
                | (Self::Approved, Self::Closed)
                | (Self::Rejected, Self::Closed)
        )
    }

    /// Whether the case is finished and must not be mutated further.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How urgently staff should pick the case up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl CasePriority {
    /// Stable snake_case name used in persistence and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Parse the persisted snake_case representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Immigration service request tracked through the status lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[schema(value_type = String)]
    pub id: CaseId,
    #[schema(value_type = String, example = "VF-K7M2P9QX")]
    pub reference: CaseReference,
    #[schema(value_type = String)]
    pub client_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub assigned_agent_id: Option<UserId>,
    pub service_type: String,
    pub title: String,
    pub details: String,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Validate that `next` is a legal transition and apply it.
    ///
    /// Returns `409 Conflict` with the offending pair in the details when
    /// the lifecycle forbids the move.
    pub fn transition_to(&mut self, next: CaseStatus) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(Error::new(
                ErrorCode::Conflict,
                format!("cannot move case from {} to {}", self.status, next),
            )
            .with_details(serde_json::json!({
                "from": self.status.as_str(),
                "to": next.as_str(),
            })));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the given user participates in this case.
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.client_id == *user_id || self.assigned_agent_id.as_ref() == Some(user_id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    use super::*;
    use crate::domain::user::UserId;

    fn sample_case(status: CaseStatus) -> Case {
        let now = Utc::now();
        Case {
            id: CaseId::random(),
            reference: CaseReference::from_stored("VF-TESTREF1"),
            client_id: UserId::random(),
            assigned_agent_id: None,
            service_type: "work_visa".into(),
            title: "Work visa application".into(),
            details: "Initial submission".into(),
            status,
            priority: CasePriority::Normal,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case(CaseStatus::Submitted, CaseStatus::UnderReview, true)]
    #[case(CaseStatus::UnderReview, CaseStatus::Approved, true)]
    #[case(CaseStatus::UnderReview, CaseStatus::Rejected, true)]
    #[case(CaseStatus::UnderReview, CaseStatus::AdditionalInfoRequired, true)]
    #[case(CaseStatus::AdditionalInfoRequired, CaseStatus::UnderReview, true)]
    #[case(CaseStatus::Approved, CaseStatus::Closed, true)]
    #[case(CaseStatus::Rejected, CaseStatus::Closed, true)]
    #[case(CaseStatus::Submitted, CaseStatus::Approved, false)]
    #[case(CaseStatus::Closed, CaseStatus::UnderReview, false)]
    #[case(CaseStatus::Approved, CaseStatus::Rejected, false)]
    #[case(CaseStatus::Submitted, CaseStatus::Submitted, false)]
    fn lifecycle_transitions(
        #[case] from: CaseStatus,
        #[case] to: CaseStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn transition_to_rejects_illegal_move_with_conflict() {
        let mut case = sample_case(CaseStatus::Closed);
        let err = case
            .transition_to(CaseStatus::UnderReview)
            .expect_err("closed is terminal");
        assert_eq!(err.code(), crate::domain::ErrorCode::Conflict);
        assert_eq!(case.status, CaseStatus::Closed);
    }

    #[test]
    fn transition_to_updates_status_and_timestamp() {
        let mut case = sample_case(CaseStatus::Submitted);
        let before = case.updated_at;
        case.transition_to(CaseStatus::UnderReview)
            .expect("legal transition");
        assert_eq!(case.status, CaseStatus::UnderReview);
        assert!(case.updated_at >= before);
    }

    #[test]
    fn generated_references_use_prefix_and_safe_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let reference = CaseReference::generate(&mut rng);
        let raw = reference.as_ref();
        assert!(raw.starts_with("VF-"));
        assert_eq!(raw.len(), 3 + 8);
        assert!(!raw.contains('0') && !raw.contains('O'));
        assert!(!raw.contains('1') && !raw.contains('I'));
    }

    #[test]
    fn participants_are_client_and_assigned_agent() {
        let mut case = sample_case(CaseStatus::UnderReview);
        let agent = UserId::random();
        let stranger = UserId::random();
        case.assigned_agent_id = Some(agent);
        assert!(case.is_participant(&case.client_id.clone()));
        assert!(case.is_participant(&agent));
        assert!(!case.is_participant(&stranger));
    }

    #[rstest]
    #[case("submitted", Some(CaseStatus::Submitted))]
    #[case("additional_info_required", Some(CaseStatus::AdditionalInfoRequired))]
    #[case("closed", Some(CaseStatus::Closed))]
    #[case("archived", None)]
    fn status_parse_round_trips_persisted_names(
        #[case] raw: &str,
        #[case] expected: Option<CaseStatus>,
    ) {
        assert_eq!(CaseStatus::parse(raw), expected);
        if let Some(status) = expected {
            assert_eq!(status.as_str(), raw);
        }
    }
}
