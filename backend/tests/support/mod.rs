//! Shared fixtures for the HTTP integration suites: in-memory port
//! implementations, a fully wired [`HttpState`], and session helpers.

// Each test binary exercises a subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use backend::domain::activity::ActivityEntry;
use backend::domain::assignment::{CaseAssignmentService, TransferRecord};
use backend::domain::auth::PasswordDigest;
use backend::domain::avatar::AvatarService;
use backend::domain::billing::PaymentService;
use backend::domain::case::{Case, CaseId, CasePriority, CaseReference, CaseStatus};
use backend::domain::case_service::CaseService;
use backend::domain::invite::InviteCode;
use backend::domain::legal::LegalDocument;
use backend::domain::message::CaseMessage;
use backend::domain::messaging::MessageService;
use backend::domain::notification::{Notification, NotificationFanout};
use backend::domain::payment::Payment;
use backend::domain::ports::{
    ActivityListFilter, ActivityLogError, ActivityLogRepository, CaseListFilter,
    CasePersistenceError, CaseRepository, FileStorage, InvitePersistenceError, InviteRepository,
    LegalDocumentRepository, LegalPersistenceError, LoginService, Mailer,
    MessagePersistenceError, MessageRepository, NotificationPersistenceError,
    NotificationRepository, NotifyError, OutboundEmail, PaymentGateway, PaymentGatewayError,
    PaymentIntent, PaymentPersistenceError, PaymentRepository, RealtimeNotifier, SeedRun,
    SeedRunsError, SeedRunsRepository, StorageError, TemplatePersistenceError,
    TemplateRepository, TransferLogError, TransferLogRepository, UserPersistenceError,
    UserRepository,
};
use backend::domain::registration::RegistrationService;
use backend::domain::seed::{SeedService, SeedSettings};
use backend::domain::template::DocumentTemplate;
use backend::domain::user::{DisplayName, Email, Role, User, UserId, UserStatus};
use backend::domain::Error;
use backend::inbound::http::state::{HttpState, WebhookSecrets};

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct-horse-battery";
/// Secret guarding the payment webhook in tests.
pub const PAYMENT_WEBHOOK_SECRET: &str = "pay-secret";
/// Secret guarding the email webhook in tests.
pub const EMAIL_WEBHOOK_SECRET: &str = "mail-secret";

struct StoredUser {
    user: User,
    salt_hex: String,
    digest_hex: String,
}

/// In-memory user store doubling as the login service.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<StoredUser>>,
}

impl InMemoryUsers {
    /// Seed an account directly, bypassing registration.
    pub fn seed(&self, user: User, digest: &PasswordDigest) {
        self.rows.lock().expect("lock").push(StoredUser {
            user,
            salt_hex: digest.salt_hex().to_owned(),
            digest_hex: digest.digest_hex().to_owned(),
        });
    }

    /// Snapshot a stored user by id.
    pub fn get(&self, id: &UserId) -> Option<User> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .find(|row| row.user.id == *id)
            .map(|row| row.user.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(
        &self,
        user: &User,
        salt_hex: &str,
        digest_hex: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        if rows.iter().any(|row| row.user.email == user.email) {
            return Err(UserPersistenceError::duplicate_email());
        }
        rows.push(StoredUser {
            user: user.clone(),
            salt_hex: salt_hex.to_owned(),
            digest_hex: digest_hex.to_owned(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.get(id))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .find(|row| row.user.email == *email)
            .map(|row| row.user.clone()))
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|row| role.is_none_or(|role| row.user.role == role))
            .map(|row| row.user.clone())
            .collect())
    }

    async fn update_status(
        &self,
        id: &UserId,
        status: UserStatus,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(row) = rows.iter_mut().find(|row| row.user.id == *id) else {
            return Ok(None);
        };
        row.user.status = status;
        row.user.updated_at = Utc::now();
        Ok(Some(row.user.clone()))
    }

    async fn count_active_admins(&self) -> Result<u64, UserPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|row| row.user.role == Role::Admin && row.user.is_active())
            .count() as u64)
    }

    async fn set_avatar_if_matches(
        &self,
        id: &UserId,
        new_url: Option<&str>,
        expected: Option<&str>,
    ) -> Result<bool, UserPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(row) = rows.iter_mut().find(|row| row.user.id == *id) else {
            return Ok(false);
        };
        if row.user.avatar_url.as_deref() != expected {
            return Ok(false);
        }
        row.user.avatar_url = new_url.map(str::to_owned);
        row.user.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl LoginService for InMemoryUsers {
    async fn authenticate(
        &self,
        credentials: &backend::domain::auth::LoginCredentials,
    ) -> Result<User, Error> {
        let stored = {
            let rows = self.rows.lock().expect("lock");
            rows.iter()
                .find(|row| row.user.email == *credentials.email())
                .map(|row| {
                    (
                        row.user.clone(),
                        PasswordDigest::from_stored(row.salt_hex.clone(), row.digest_hex.clone()),
                    )
                })
        };
        let Some((user, digest)) = stored else {
            return Err(Error::unauthorized("invalid email or password"));
        };
        if !digest.verify(credentials.password()) {
            return Err(Error::unauthorized("invalid email or password"));
        }
        if user.status == UserStatus::Suspended {
            return Err(Error::forbidden("account is suspended"));
        }
        Ok(user)
    }
}

/// In-memory case store.
#[derive(Default)]
pub struct InMemoryCases {
    rows: Mutex<Vec<Case>>,
}

impl InMemoryCases {
    /// Seed a case directly.
    pub fn seed(&self, case: Case) {
        self.rows.lock().expect("lock").push(case);
    }

    /// Snapshot a stored case by id.
    pub fn get(&self, id: &CaseId) -> Option<Case> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .find(|case| case.id == *id)
            .cloned()
    }
}

#[async_trait]
impl CaseRepository for InMemoryCases {
    async fn insert(&self, case: &Case) -> Result<(), CasePersistenceError> {
        self.rows.lock().expect("lock").push(case.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CaseId) -> Result<Option<Case>, CasePersistenceError> {
        Ok(self.get(id))
    }

    async fn list(&self, filter: &CaseListFilter) -> Result<Vec<Case>, CasePersistenceError> {
        let mut cases: Vec<Case> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|case| {
                filter.client_id.is_none_or(|id| case.client_id == id)
                    && filter
                        .assigned_agent_id
                        .is_none_or(|id| case.assigned_agent_id == Some(id))
                    && filter.status.is_none_or(|status| case.status == status)
            })
            .cloned()
            .collect();
        cases.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(cases)
    }

    async fn update(&self, case: &Case) -> Result<(), CasePersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        if let Some(stored) = rows.iter_mut().find(|stored| stored.id == case.id) {
            *stored = case.clone();
        }
        Ok(())
    }
}

/// In-memory message store.
#[derive(Default)]
pub struct InMemoryMessages {
    rows: Mutex<Vec<CaseMessage>>,
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn insert(&self, message: &CaseMessage) -> Result<(), MessagePersistenceError> {
        self.rows.lock().expect("lock").push(message.clone());
        Ok(())
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<CaseMessage>, MessagePersistenceError> {
        let mut messages: Vec<CaseMessage> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|message| message.case_id == *case_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
        Ok(messages)
    }

    async fn mark_read(
        &self,
        case_id: &CaseId,
        reader: &UserId,
    ) -> Result<u64, MessagePersistenceError> {
        let mut updated = 0;
        for message in self.rows.lock().expect("lock").iter_mut() {
            if message.case_id == *case_id
                && message.sender_id != *reader
                && message.read_at.is_none()
            {
                message.read_at = Some(Utc::now());
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// In-memory notification store.
#[derive(Default)]
pub struct InMemoryNotifications {
    rows: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    /// Seed a notification directly.
    pub fn seed(&self, notification: Notification) {
        self.rows.lock().expect("lock").push(notification);
    }

    /// Snapshot everything stored for one user.
    pub fn for_user(&self, user_id: &UserId) -> Vec<Notification> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|n| n.user_id == *user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotifications {
    async fn insert(
        &self,
        notification: &Notification,
    ) -> Result<(), NotificationPersistenceError> {
        self.rows.lock().expect("lock").push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, NotificationPersistenceError> {
        let mut notifications: Vec<Notification> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|n| n.user_id == *user_id && (!unread_only || !n.read))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_read(
        &self,
        id: Uuid,
        user_id: &UserId,
    ) -> Result<bool, NotificationPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(row) = rows
            .iter_mut()
            .find(|n| n.id == id && n.user_id == *user_id)
        else {
            return Ok(false);
        };
        row.read = true;
        Ok(true)
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
    ) -> Result<u64, NotificationPersistenceError> {
        let mut updated = 0;
        for row in self.rows.lock().expect("lock").iter_mut() {
            if row.user_id == *user_id && !row.read {
                row.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// In-memory invite store with the same conditional consume as Postgres.
#[derive(Default)]
pub struct InMemoryInvites {
    rows: Mutex<Vec<InviteCode>>,
}

impl InMemoryInvites {
    /// Seed an invite directly.
    pub fn seed(&self, invite: InviteCode) {
        self.rows.lock().expect("lock").push(invite);
    }

    /// Snapshot a stored invite by id.
    pub fn get(&self, id: Uuid) -> Option<InviteCode> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .find(|invite| invite.id == id)
            .cloned()
    }
}

#[async_trait]
impl InviteRepository for InMemoryInvites {
    async fn insert(&self, invite: &InviteCode) -> Result<(), InvitePersistenceError> {
        self.rows.lock().expect("lock").push(invite.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<InviteCode>, InvitePersistenceError> {
        let mut invites = self.rows.lock().expect("lock").clone();
        invites.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invites)
    }

    async fn find_by_code(
        &self,
        code: &str,
    ) -> Result<Option<InviteCode>, InvitePersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .find(|invite| invite.code == code)
            .cloned())
    }

    async fn revoke(&self, id: Uuid) -> Result<bool, InvitePersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(invite) = rows.iter_mut().find(|invite| invite.id == id) else {
            return Ok(false);
        };
        invite.revoked = true;
        Ok(true)
    }

    async fn try_consume(&self, id: Uuid) -> Result<bool, InvitePersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let Some(invite) = rows.iter_mut().find(|invite| invite.id == id) else {
            return Ok(false);
        };
        if invite.revoked || invite.used_count >= invite.max_uses {
            return Ok(false);
        }
        invite.used_count += 1;
        Ok(true)
    }
}

/// In-memory template store.
#[derive(Default)]
pub struct InMemoryTemplates {
    rows: Mutex<Vec<DocumentTemplate>>,
}

#[async_trait]
impl TemplateRepository for InMemoryTemplates {
    async fn insert(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError> {
        self.rows.lock().expect("lock").push(template.clone());
        Ok(())
    }

    async fn update(&self, template: &DocumentTemplate) -> Result<(), TemplatePersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        if let Some(stored) = rows.iter_mut().find(|stored| stored.id == template.id) {
            *stored = template.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, TemplatePersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let before = rows.len();
        rows.retain(|template| template.id != id);
        Ok(rows.len() < before)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<DocumentTemplate>, TemplatePersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .find(|template| template.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentTemplate>, TemplatePersistenceError> {
        let mut templates = self.rows.lock().expect("lock").clone();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}

/// In-memory legal document store with append-only versioning.
#[derive(Default)]
pub struct InMemoryLegal {
    rows: Mutex<Vec<LegalDocument>>,
}

#[async_trait]
impl LegalDocumentRepository for InMemoryLegal {
    async fn find_latest_published(
        &self,
        slug: &str,
    ) -> Result<Option<LegalDocument>, LegalPersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|doc| doc.slug == slug && doc.published)
            .max_by_key(|doc| doc.version)
            .cloned())
    }

    async fn list_versions(
        &self,
        slug: &str,
    ) -> Result<Vec<LegalDocument>, LegalPersistenceError> {
        let mut versions: Vec<LegalDocument> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|doc| doc.slug == slug)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(versions)
    }

    async fn publish(
        &self,
        slug: &str,
        title: &str,
        body: &str,
    ) -> Result<LegalDocument, LegalPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        let next_version = rows
            .iter()
            .filter(|doc| doc.slug == slug)
            .map(|doc| doc.version)
            .max()
            .unwrap_or(0)
            + 1;
        let document = LegalDocument {
            id: Uuid::new_v4(),
            slug: slug.to_owned(),
            version: next_version,
            title: title.to_owned(),
            body: body.to_owned(),
            published: true,
            created_at: Utc::now(),
        };
        rows.push(document.clone());
        Ok(document)
    }
}

/// In-memory payment store.
#[derive(Default)]
pub struct InMemoryPayments {
    rows: Mutex<Vec<Payment>>,
}

impl InMemoryPayments {
    /// Seed a payment directly.
    pub fn seed(&self, payment: Payment) {
        self.rows.lock().expect("lock").push(payment);
    }

    /// Snapshot a stored payment by provider reference.
    pub fn get_by_provider_ref(&self, provider_ref: &str) -> Option<Payment> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .find(|payment| payment.provider_ref == provider_ref)
            .cloned()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPayments {
    async fn insert(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        self.rows.lock().expect("lock").push(payment.clone());
        Ok(())
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<Payment>, PaymentPersistenceError> {
        let mut payments: Vec<Payment> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|payment| payment.case_id == *case_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn find_by_provider_ref(
        &self,
        provider_ref: &str,
    ) -> Result<Option<Payment>, PaymentPersistenceError> {
        Ok(self.get_by_provider_ref(provider_ref))
    }

    async fn update(&self, payment: &Payment) -> Result<(), PaymentPersistenceError> {
        let mut rows = self.rows.lock().expect("lock");
        if let Some(stored) = rows.iter_mut().find(|stored| stored.id == payment.id) {
            *stored = payment.clone();
        }
        Ok(())
    }
}

/// In-memory transfer history.
#[derive(Default)]
pub struct InMemoryTransfers {
    rows: Mutex<Vec<TransferRecord>>,
}

#[async_trait]
impl TransferLogRepository for InMemoryTransfers {
    async fn record(&self, transfer: &TransferRecord) -> Result<(), TransferLogError> {
        self.rows.lock().expect("lock").push(transfer.clone());
        Ok(())
    }

    async fn list_for_case(
        &self,
        case_id: &CaseId,
    ) -> Result<Vec<TransferRecord>, TransferLogError> {
        let mut transfers: Vec<TransferRecord> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|transfer| transfer.case_id == *case_id)
            .cloned()
            .collect();
        transfers.sort_by(|a, b| b.transferred_at.cmp(&a.transferred_at));
        Ok(transfers)
    }
}

/// In-memory audit trail.
#[derive(Default)]
pub struct InMemoryActivity {
    rows: Mutex<Vec<ActivityEntry>>,
}

impl InMemoryActivity {
    /// Snapshot all recorded actions, oldest first.
    pub fn actions(&self) -> Vec<String> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .map(|entry| entry.action.clone())
            .collect()
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryActivity {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), ActivityLogError> {
        self.rows.lock().expect("lock").push(entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &ActivityListFilter,
    ) -> Result<Vec<ActivityEntry>, ActivityLogError> {
        let mut entries: Vec<ActivityEntry> = self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .filter(|entry| filter.case_id.is_none_or(|id| entry.case_id == Some(id)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }
}

/// In-memory seed run ledger.
#[derive(Default)]
pub struct InMemorySeedRuns {
    rows: Mutex<Vec<SeedRun>>,
}

#[async_trait]
impl SeedRunsRepository for InMemorySeedRuns {
    async fn find(&self, seed_name: &str) -> Result<Option<SeedRun>, SeedRunsError> {
        Ok(self
            .rows
            .lock()
            .expect("lock")
            .iter()
            .find(|run| run.seed_name == seed_name)
            .cloned())
    }

    async fn record(&self, run: &SeedRun) -> Result<(), SeedRunsError> {
        let mut rows = self.rows.lock().expect("lock");
        if !rows.iter().any(|stored| stored.seed_name == run.seed_name) {
            rows.push(run.clone());
        }
        Ok(())
    }
}

/// Gateway stub minting sequential provider references.
#[derive(Default)]
pub struct StubGateway {
    counter: AtomicU64,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(
        &self,
        _amount_cents: i64,
        _currency: &str,
        _reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentIntent {
            provider_ref: format!("pi_test_{n}"),
            client_secret: format!("cs_test_{n}"),
        })
    }
}

/// Storage fake recording every delete.
#[derive(Default)]
pub struct RecordingStorage {
    deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    /// URLs deleted so far, in call order.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("lock").clone()
    }
}

#[async_trait]
impl FileStorage for RecordingStorage {
    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        self.deleted.lock().expect("lock").push(url.to_owned());
        Ok(())
    }
}

/// Realtime channel fake swallowing pushes.
#[derive(Default)]
pub struct CollectingRealtime {
    pushed: Mutex<Vec<Notification>>,
}

#[async_trait]
impl RealtimeNotifier for CollectingRealtime {
    async fn push(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.pushed.lock().expect("lock").push(notification.clone());
        Ok(())
    }
}

/// Mailer fake swallowing sends.
#[derive(Default)]
pub struct CollectingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl Mailer for CollectingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        self.sent.lock().expect("lock").push(email.clone());
        Ok(())
    }
}

/// Fully wired in-memory backend, with handles onto the individual stores.
pub struct TestBackend {
    pub state: HttpState,
    pub users: Arc<InMemoryUsers>,
    pub cases: Arc<InMemoryCases>,
    pub messages: Arc<InMemoryMessages>,
    pub notifications: Arc<InMemoryNotifications>,
    pub invites: Arc<InMemoryInvites>,
    pub payments: Arc<InMemoryPayments>,
    pub activity: Arc<InMemoryActivity>,
    pub storage: Arc<RecordingStorage>,
}

/// Build an [`HttpState`] over fresh in-memory stores.
pub fn test_backend() -> TestBackend {
    let users = Arc::new(InMemoryUsers::default());
    let cases = Arc::new(InMemoryCases::default());
    let messages = Arc::new(InMemoryMessages::default());
    let notifications = Arc::new(InMemoryNotifications::default());
    let invites = Arc::new(InMemoryInvites::default());
    let templates = Arc::new(InMemoryTemplates::default());
    let legal = Arc::new(InMemoryLegal::default());
    let payments = Arc::new(InMemoryPayments::default());
    let transfers = Arc::new(InMemoryTransfers::default());
    let activity = Arc::new(InMemoryActivity::default());
    let seed_runs = Arc::new(InMemorySeedRuns::default());
    let storage = Arc::new(RecordingStorage::default());

    let fanout = NotificationFanout::new(
        Arc::clone(&notifications) as Arc<dyn NotificationRepository>,
        Arc::new(CollectingRealtime::default()),
        Arc::new(CollectingMailer::default()),
    );

    let state = HttpState {
        login: Arc::clone(&users) as Arc<dyn LoginService>,
        users: Arc::clone(&users) as Arc<dyn UserRepository>,
        notifications: Arc::clone(&notifications) as Arc<dyn NotificationRepository>,
        invites: Arc::clone(&invites) as Arc<dyn InviteRepository>,
        templates: Arc::clone(&templates) as Arc<dyn TemplateRepository>,
        legal: Arc::clone(&legal) as Arc<dyn LegalDocumentRepository>,
        activity: Arc::clone(&activity) as Arc<dyn ActivityLogRepository>,
        registration: RegistrationService::new(
            Arc::clone(&invites) as Arc<dyn InviteRepository>,
            Arc::clone(&users) as Arc<dyn UserRepository>,
            fanout.clone(),
        ),
        cases: CaseService::new(
            Arc::clone(&cases) as Arc<dyn CaseRepository>,
            Arc::clone(&activity) as Arc<dyn ActivityLogRepository>,
            fanout.clone(),
        ),
        assignment: CaseAssignmentService::new(
            Arc::clone(&cases) as Arc<dyn CaseRepository>,
            Arc::clone(&users) as Arc<dyn UserRepository>,
            Arc::clone(&transfers) as Arc<dyn TransferLogRepository>,
            Arc::clone(&activity) as Arc<dyn ActivityLogRepository>,
            fanout.clone(),
        ),
        messages: MessageService::new(
            Arc::clone(&messages) as Arc<dyn MessageRepository>,
            Arc::clone(&cases) as Arc<dyn CaseRepository>,
            Arc::clone(&users) as Arc<dyn UserRepository>,
            fanout.clone(),
        ),
        payments: PaymentService::new(
            Arc::clone(&payments) as Arc<dyn PaymentRepository>,
            Arc::new(StubGateway::default()),
            Arc::clone(&cases) as Arc<dyn CaseRepository>,
            Arc::clone(&activity) as Arc<dyn ActivityLogRepository>,
            fanout.clone(),
        ),
        avatar: AvatarService::new(
            Arc::clone(&users) as Arc<dyn UserRepository>,
            Arc::clone(&storage) as Arc<dyn FileStorage>,
        ),
        seed: SeedService::new(
            Arc::clone(&users) as Arc<dyn UserRepository>,
            Arc::clone(&cases) as Arc<dyn CaseRepository>,
            Arc::clone(&notifications) as Arc<dyn NotificationRepository>,
            Arc::clone(&seed_runs) as Arc<dyn SeedRunsRepository>,
        ),
        seed_settings: SeedSettings::default(),
        webhook_secrets: WebhookSecrets {
            payments: Some(PAYMENT_WEBHOOK_SECRET.to_owned()),
            email: Some(EMAIL_WEBHOOK_SECRET.to_owned()),
        },
    };

    TestBackend {
        state,
        users,
        cases,
        messages,
        notifications,
        invites,
        payments,
        activity,
        storage,
    }
}

impl TestBackend {
    /// Seed an active account with the shared test password.
    pub fn seed_user(&self, email: &str, role: Role) -> User {
        let user = User::new(
            UserId::random(),
            Email::new(email).expect("valid fixture email"),
            DisplayName::new("Test User").expect("valid fixture name"),
            role,
        );
        self.users.seed(user.clone(), &PasswordDigest::create(PASSWORD));
        user
    }

    /// Seed a submitted case owned by the given client.
    pub fn seed_case(&self, client: &User) -> Case {
        self.seed_case_with_status(client, CaseStatus::Submitted)
    }

    /// Seed a case in an arbitrary lifecycle state.
    pub fn seed_case_with_status(&self, client: &User, status: CaseStatus) -> Case {
        let now = Utc::now();
        let case = Case {
            id: CaseId::random(),
            reference: CaseReference::from_stored(format!(
                "VF-{}",
                &Uuid::new_v4().simple().to_string()[..8].to_ascii_uppercase()
            )),
            client_id: client.id,
            assigned_agent_id: None,
            service_type: "work_visa".to_owned(),
            title: "Work visa application".to_owned(),
            details: "Initial submission".to_owned(),
            status,
            priority: CasePriority::Normal,
            created_at: now,
            updated_at: now,
        };
        self.cases.seed(case.clone());
        case
    }
}

/// Session middleware matching the production cookie name, without `Secure`.
pub fn session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Log in as a seeded account and return the session cookie.
pub async fn login(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    >,
    email: &str,
) -> Cookie<'static> {
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK, "login should succeed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}

/// Read the response body as JSON.
pub async fn body_json(res: ServiceResponse) -> serde_json::Value {
    let bytes = test::read_body(res).await;
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// `web::Data` wrapper for the shared state.
pub fn app_data(state: &HttpState) -> web::Data<HttpState> {
    web::Data::new(state.clone())
}
