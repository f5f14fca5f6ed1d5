//! Case assignment and transfer use-cases.
//!
//! This is where the assignment rules live: who may assign,
//! which agents are eligible, and which case states accept (re)assignment.
//! Each mutation commits the database write first and then fans out
//! notifications as fire-and-forget work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::{Case, CaseId, CaseStatus};
use crate::domain::notification::{Notification, NotificationFanout, NotificationKind};
use crate::domain::ports::{
    ActivityLogRepository, CasePersistenceError, CaseRepository, OutboundEmail, TransferLogError,
    TransferLogRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::{Role, User, UserId};
use crate::domain::Error;

/// One recorded case hand-over between agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    #[schema(value_type = String)]
    pub id: Uuid,
    #[schema(value_type = String)]
    pub case_id: CaseId,
    #[schema(value_type = String)]
    pub from_agent_id: UserId,
    #[schema(value_type = String)]
    pub to_agent_id: UserId,
    pub reason: String,
    #[schema(value_type = String)]
    pub transferred_by: UserId,
    pub transferred_at: DateTime<Utc>,
}

/// Outcome of one item in a bulk assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAssignOutcome {
    #[schema(value_type = String)]
    pub case_id: CaseId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Assignment and transfer use-cases over the case and user ports.
#[derive(Clone)]
pub struct CaseAssignmentService {
    cases: Arc<dyn CaseRepository>,
    users: Arc<dyn UserRepository>,
    transfers: Arc<dyn TransferLogRepository>,
    activity: Arc<dyn ActivityLogRepository>,
    fanout: NotificationFanout,
}

fn map_case_error(error: CasePersistenceError) -> Error {
    match error {
        CasePersistenceError::Connection { message } => Error::service_unavailable(message),
        CasePersistenceError::Query { message } => Error::internal(message),
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => {
            Error::internal("unexpected duplicate email during assignment")
        }
    }
}

fn map_transfer_error(error: TransferLogError) -> Error {
    match error {
        TransferLogError::Connection { message } => Error::service_unavailable(message),
        TransferLogError::Query { message } => Error::internal(message),
    }
}

impl CaseAssignmentService {
    /// Assemble the service over its ports.
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        users: Arc<dyn UserRepository>,
        transfers: Arc<dyn TransferLogRepository>,
        activity: Arc<dyn ActivityLogRepository>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            cases,
            users,
            transfers,
            activity,
            fanout,
        }
    }

    /// Assign a case to an agent (first assignment or reassignment).
    ///
    /// Preconditions, in order: actor is an admin; the case exists and is
    /// not closed; the target is an active agent; the case is not already
    /// assigned to that agent.
    pub async fn assign(
        &self,
        actor: &User,
        case_id: CaseId,
        agent_id: UserId,
    ) -> Result<Case, Error> {
        require_admin(actor)?;
        let mut case = self.load_open_case(case_id).await?;
        let agent = self.load_eligible_agent(&agent_id).await?;
        if case.assigned_agent_id == Some(agent_id) {
            return Err(Error::conflict("case is already assigned to this agent"));
        }

        case.assigned_agent_id = Some(agent_id);
        if case.status == CaseStatus::Submitted {
            // First assignment pulls the case into review.
            case.transition_to(CaseStatus::UnderReview)?;
        } else {
            case.updated_at = Utc::now();
        }
        self.cases.update(&case).await.map_err(map_case_error)?;

        self.record_activity(
            actor,
            "case_assigned",
            &case,
            json!({ "agentId": agent_id.to_string() }),
        )
        .await;
        self.notify_assignment(&case, &agent);
        Ok(case)
    }

    /// Transfer an assigned case to a different agent, recording history.
    pub async fn transfer(
        &self,
        actor: &User,
        case_id: CaseId,
        agent_id: UserId,
        reason: String,
    ) -> Result<Case, Error> {
        require_admin(actor)?;
        if reason.trim().is_empty() {
            return Err(Error::invalid_request("transfer reason must not be empty"));
        }
        let mut case = self.load_open_case(case_id).await?;
        let Some(from_agent_id) = case.assigned_agent_id else {
            return Err(Error::invalid_request(
                "case is not assigned; use assign instead of transfer",
            ));
        };
        if from_agent_id == agent_id {
            return Err(Error::conflict("case is already assigned to this agent"));
        }
        let agent = self.load_eligible_agent(&agent_id).await?;

        case.assigned_agent_id = Some(agent_id);
        case.updated_at = Utc::now();
        self.cases.update(&case).await.map_err(map_case_error)?;

        let record = TransferRecord {
            id: Uuid::new_v4(),
            case_id,
            from_agent_id,
            to_agent_id: agent_id,
            reason: reason.clone(),
            transferred_by: actor.id,
            transferred_at: Utc::now(),
        };
        self.transfers
            .record(&record)
            .await
            .map_err(map_transfer_error)?;

        self.record_activity(
            actor,
            "case_transferred",
            &case,
            json!({
                "fromAgentId": from_agent_id.to_string(),
                "toAgentId": agent_id.to_string(),
                "reason": reason,
            }),
        )
        .await;

        // Outgoing agent gets an in-app note; the incoming agent also gets
        // email because the case now sits in their queue.
        self.fanout.spawn_dispatch(
            Notification::new(
                from_agent_id,
                NotificationKind::CaseTransferred,
                "Case transferred away",
                format!("Case {} was transferred to another agent", case.reference),
                Some(case.id),
            ),
            None,
        );
        self.notify_assignment(&case, &agent);
        Ok(case)
    }

    /// Remove the current assignment from a case.
    pub async fn unassign(&self, actor: &User, case_id: CaseId) -> Result<Case, Error> {
        require_admin(actor)?;
        let mut case = self.load_open_case(case_id).await?;
        let Some(previous) = case.assigned_agent_id.take() else {
            return Err(Error::conflict("case is not assigned"));
        };
        case.updated_at = Utc::now();
        self.cases.update(&case).await.map_err(map_case_error)?;

        self.record_activity(
            actor,
            "case_unassigned",
            &case,
            json!({ "previousAgentId": previous.to_string() }),
        )
        .await;
        self.fanout.spawn_dispatch(
            Notification::new(
                previous,
                NotificationKind::CaseTransferred,
                "Case unassigned",
                format!("Case {} was removed from your queue", case.reference),
                Some(case.id),
            ),
            None,
        );
        Ok(case)
    }

    /// Assign many cases to one agent; failures never abort the batch.
    pub async fn bulk_assign(
        &self,
        actor: &User,
        case_ids: &[CaseId],
        agent_id: UserId,
    ) -> Result<Vec<BulkAssignOutcome>, Error> {
        require_admin(actor)?;
        // Validate the agent once so a dead target fails fast instead of
        // producing N identical per-item errors.
        self.load_eligible_agent(&agent_id).await?;

        let mut outcomes = Vec::with_capacity(case_ids.len());
        for case_id in case_ids {
            let outcome = match self.assign(actor, *case_id, agent_id).await {
                Ok(_) => BulkAssignOutcome {
                    case_id: *case_id,
                    success: true,
                    message: None,
                },
                Err(error) => BulkAssignOutcome {
                    case_id: *case_id,
                    success: false,
                    message: Some(error.message().to_owned()),
                },
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Transfer history for a case, newest first.
    pub async fn transfer_history(
        &self,
        actor: &User,
        case_id: CaseId,
    ) -> Result<Vec<TransferRecord>, Error> {
        if !actor.role.is_staff() {
            return Err(Error::forbidden("staff access required"));
        }
        // 404 before history so non-existent cases do not appear empty.
        let _ = self.load_case(case_id).await?;
        self.transfers
            .list_for_case(&case_id)
            .await
            .map_err(map_transfer_error)
    }

    async fn load_case(&self, case_id: CaseId) -> Result<Case, Error> {
        self.cases
            .find_by_id(&case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("case not found"))
    }

    async fn load_open_case(&self, case_id: CaseId) -> Result<Case, Error> {
        let case = self.load_case(case_id).await?;
        if case.status.is_terminal() {
            return Err(Error::invalid_request("case is closed"));
        }
        Ok(case)
    }

    async fn load_eligible_agent(&self, agent_id: &UserId) -> Result<User, Error> {
        let agent = self
            .users
            .find_by_id(agent_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::invalid_request("target agent not found"))?;
        if agent.role != Role::Agent {
            return Err(Error::invalid_request("target user is not an agent"));
        }
        if !agent.is_active() {
            return Err(Error::invalid_request("target agent is not active"));
        }
        Ok(agent)
    }

    async fn record_activity(
        &self,
        actor: &User,
        action: &str,
        case: &Case,
        details: serde_json::Value,
    ) {
        let entry = ActivityEntry::new(actor.id, action, Some(case.id), details);
        if let Err(error) = self.activity.record(&entry).await {
            warn!(case_id = %case.id, action, %error, "failed to record activity entry");
        }
    }

    fn notify_assignment(&self, case: &Case, agent: &User) {
        self.fanout.spawn_dispatch(
            Notification::new(
                agent.id,
                NotificationKind::CaseAssigned,
                "Case assigned to you",
                format!("Case {} is now in your queue", case.reference),
                Some(case.id),
            ),
            Some(OutboundEmail {
                to: agent.email.to_string(),
                subject: format!("Case {} assigned to you", case.reference),
                body: format!(
                    "Case {} ({}) has been assigned to you.",
                    case.reference, case.title
                ),
            }),
        );
        self.fanout.spawn_dispatch(
            Notification::new(
                case.client_id,
                NotificationKind::CaseAssigned,
                "An agent is on your case",
                format!("Case {} has been assigned to an agent", case.reference),
                Some(case.id),
            ),
            None,
        );
    }
}

fn require_admin(actor: &User) -> Result<(), Error> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(Error::forbidden("admin access required"))
    }
}
