//! Case message threads and the inbound email webhook use-case.

use std::sync::Arc;

use crate::domain::case::{Case, CaseId};
use crate::domain::message::CaseMessage;
use crate::domain::notification::{Notification, NotificationFanout, NotificationKind};
use crate::domain::ports::{
    CaseListFilter, CasePersistenceError, CaseRepository, MessagePersistenceError,
    MessageRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::{Email, Role, User};
use crate::domain::Error;

/// What the inbound email webhook did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEmailOutcome {
    /// Appended to the sender's most recently updated open case.
    AppendedToCase,
    /// Stored as a system notification; the sender has no open case.
    StoredAsNotification,
    /// Sender unknown; payload dropped.
    Dropped,
}

/// Message thread use-cases over the message and case ports.
#[derive(Clone)]
pub struct MessageService {
    messages: Arc<dyn MessageRepository>,
    cases: Arc<dyn CaseRepository>,
    users: Arc<dyn UserRepository>,
    fanout: NotificationFanout,
}

fn map_message_error(error: MessagePersistenceError) -> Error {
    match error {
        MessagePersistenceError::Connection { message } => Error::service_unavailable(message),
        MessagePersistenceError::Query { message } => Error::internal(message),
    }
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
            Error::internal("unexpected duplicate email during message handling")
        }
    }
}

impl MessageService {
    /// Assemble the service over its ports.
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        cases: Arc<dyn CaseRepository>,
        users: Arc<dyn UserRepository>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            messages,
            cases,
            users,
            fanout,
        }
    }

    /// Post a message on a case thread.
    pub async fn post(
        &self,
        actor: &User,
        case_id: CaseId,
        body: String,
    ) -> Result<CaseMessage, Error> {
        let case = self.load_participant_case(actor, case_id).await?;
        let message = CaseMessage::new(case_id, actor.id, body)?;
        self.messages
            .insert(&message)
            .await
            .map_err(map_message_error)?;

        // Notify the counterpart: clients write to the agent (when there is
        // one), staff write to the client.
        let recipient = if actor.id == case.client_id {
            case.assigned_agent_id
        } else {
            Some(case.client_id)
        };
        if let Some(recipient) = recipient {
            self.fanout.spawn_dispatch(
                Notification::new(
                    recipient,
                    NotificationKind::NewMessage,
                    "New message",
                    format!("New message on case {}", case.reference),
                    Some(case.id),
                ),
                None,
            );
        }
        Ok(message)
    }

    /// List a case's messages, oldest first.
    pub async fn list(&self, actor: &User, case_id: CaseId) -> Result<Vec<CaseMessage>, Error> {
        let _ = self.load_participant_case(actor, case_id).await?;
        self.messages
            .list_for_case(&case_id)
            .await
            .map_err(map_message_error)
    }

    /// Mark all messages not sent by the actor as read; returns the count.
    pub async fn mark_read(&self, actor: &User, case_id: CaseId) -> Result<u64, Error> {
        let _ = self.load_participant_case(actor, case_id).await?;
        self.messages
            .mark_read(&case_id, &actor.id)
            .await
            .map_err(map_message_error)
    }

    /// Route an inbound email to a case thread or a notification.
    ///
    /// Unknown senders are dropped without error; webhooks must not act as
    /// an account-existence oracle.
    pub async fn ingest_inbound_email(
        &self,
        from: &Email,
        subject: &str,
        text: &str,
    ) -> Result<InboundEmailOutcome, Error> {
        let Some(sender) = self
            .users
            .find_by_email(from)
            .await
            .map_err(map_user_error)?
        else {
            return Ok(InboundEmailOutcome::Dropped);
        };

        let open_cases = self
            .cases
            .list(&CaseListFilter {
                client_id: Some(sender.id),
                ..CaseListFilter::default()
            })
            .await
            .map_err(map_case_error)?;
        let target = open_cases.into_iter().find(|case| !case.status.is_terminal());

        match target {
            Some(case) => {
                let body = if subject.trim().is_empty() {
                    text.to_owned()
                } else {
                    format!("{subject}\n\n{text}")
                };
                let message = CaseMessage::new(case.id, sender.id, body)?;
                self.messages
                    .insert(&message)
                    .await
                    .map_err(map_message_error)?;
                if let Some(agent_id) = case.assigned_agent_id {
                    self.fanout.spawn_dispatch(
                        Notification::new(
                            agent_id,
                            NotificationKind::NewMessage,
                            "New message",
                            format!("Email reply on case {}", case.reference),
                            Some(case.id),
                        ),
                        None,
                    );
                }
                Ok(InboundEmailOutcome::AppendedToCase)
            }
            None => {
                let notification = Notification::new(
                    sender.id,
                    NotificationKind::System,
                    "We received your email",
                    "Your email was received but you have no open case; please open one."
                        .to_owned(),
                    None,
                );
                self.fanout.store(&notification).await?;
                Ok(InboundEmailOutcome::StoredAsNotification)
            }
        }
    }

    async fn load_participant_case(&self, actor: &User, case_id: CaseId) -> Result<Case, Error> {
        let case = self
            .cases
            .find_by_id(&case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("case not found"))?;
        if actor.role == Role::Admin || case.is_participant(&actor.id) {
            Ok(case)
        } else {
            Err(Error::not_found("case not found"))
        }
    }
}
