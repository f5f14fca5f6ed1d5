//! Case creation, role-scoped listing, and status changes.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use tracing::warn;

use crate::domain::activity::ActivityEntry;
use crate::domain::case::{Case, CaseId, CasePriority, CaseReference, CaseStatus};
use crate::domain::notification::{Notification, NotificationFanout, NotificationKind};
use crate::domain::ports::{
    ActivityLogRepository, CaseListFilter, CasePersistenceError, CaseRepository,
};
use crate::domain::user::{Role, User};
use crate::domain::Error;

/// Request shape for creating a case.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub service_type: String,
    pub title: String,
    pub details: String,
    pub priority: CasePriority,
}

/// Case CRUD use-cases over the case port.
#[derive(Clone)]
pub struct CaseService {
    cases: Arc<dyn CaseRepository>,
    activity: Arc<dyn ActivityLogRepository>,
    fanout: NotificationFanout,
}

fn map_case_error(error: CasePersistenceError) -> Error {
    match error {
        CasePersistenceError::Connection { message } => Error::service_unavailable(message),
        CasePersistenceError::Query { message } => Error::internal(message),
    }
}

impl CaseService {
    /// Assemble the service over its ports.
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        activity: Arc<dyn ActivityLogRepository>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            cases,
            activity,
            fanout,
        }
    }

    /// Create a new case for the acting client.
    pub async fn create(&self, actor: &User, request: NewCase) -> Result<Case, Error> {
        if actor.role != Role::Client {
            return Err(Error::forbidden("only clients submit cases"));
        }
        if request.title.trim().is_empty() {
            return Err(Error::invalid_request("title must not be empty"));
        }
        if request.service_type.trim().is_empty() {
            return Err(Error::invalid_request("serviceType must not be empty"));
        }

        let now = Utc::now();
        let mut rng = StdRng::from_entropy();
        let case = Case {
            id: CaseId::random(),
            reference: CaseReference::generate(&mut rng),
            client_id: actor.id,
            assigned_agent_id: None,
            service_type: request.service_type,
            title: request.title,
            details: request.details,
            status: CaseStatus::Submitted,
            priority: request.priority,
            created_at: now,
            updated_at: now,
        };
        self.cases.insert(&case).await.map_err(map_case_error)?;
        self.record_activity(actor, "case_created", &case, json!({})).await;
        Ok(case)
    }

    /// List cases visible to the actor.
    ///
    /// Clients see their own, agents their assigned queue, admins all.
    pub async fn list(
        &self,
        actor: &User,
        status: Option<CaseStatus>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Case>, Error> {
        let mut filter = CaseListFilter {
            status,
            limit,
            offset,
            ..CaseListFilter::default()
        };
        match actor.role {
            Role::Client => filter.client_id = Some(actor.id),
            Role::Agent => filter.assigned_agent_id = Some(actor.id),
            Role::Admin => {}
        }
        self.cases.list(&filter).await.map_err(map_case_error)
    }

    /// Fetch one case the actor may see.
    ///
    /// Non-participants get 404 rather than 403 so case identifiers do not
    /// leak existence.
    pub async fn get(&self, actor: &User, case_id: CaseId) -> Result<Case, Error> {
        let case = self.load(case_id).await?;
        if actor.role == Role::Admin || case.is_participant(&actor.id) {
            Ok(case)
        } else {
            Err(Error::not_found("case not found"))
        }
    }

    /// Move a case through its lifecycle.
    ///
    /// Only the assigned agent or an admin may change status; the
    /// transition itself is validated by [`Case::transition_to`].
    pub async fn change_status(
        &self,
        actor: &User,
        case_id: CaseId,
        next: CaseStatus,
    ) -> Result<Case, Error> {
        let mut case = self.load(case_id).await?;
        let is_assigned_agent =
            actor.role == Role::Agent && case.assigned_agent_id == Some(actor.id);
        if !(is_assigned_agent || actor.role == Role::Admin) {
            return Err(Error::forbidden(
                "only the assigned agent or an admin may change status",
            ));
        }

        let previous = case.status;
        case.transition_to(next)?;
        self.cases.update(&case).await.map_err(map_case_error)?;

        self.record_activity(
            actor,
            "status_changed",
            &case,
            json!({ "from": previous.as_str(), "to": next.as_str() }),
        )
        .await;
        self.fanout.spawn_dispatch(
            Notification::new(
                case.client_id,
                NotificationKind::CaseStatusChanged,
                "Case status updated",
                format!("Case {} is now {}", case.reference, case.status),
                Some(case.id),
            ),
            None,
        );
        Ok(case)
    }

    async fn load(&self, case_id: CaseId) -> Result<Case, Error> {
        self.cases
            .find_by_id(&case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("case not found"))
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
}
