//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use crate::domain::assignment::CaseAssignmentService;
use crate::domain::avatar::AvatarService;
use crate::domain::billing::PaymentService;
use crate::domain::case_service::CaseService;
use crate::domain::messaging::MessageService;
use crate::domain::ports::{
    ActivityLogRepository, InviteRepository, LegalDocumentRepository, LoginService,
    NotificationRepository, TemplateRepository, UserRepository,
};
use crate::domain::registration::RegistrationService;
use crate::domain::seed::{SeedService, SeedSettings};

/// Shared secrets verifying inbound webhook calls.
///
/// `None` means the corresponding webhook is disabled and rejects all calls.
#[derive(Clone, Default)]
pub struct WebhookSecrets {
    pub payments: Option<String>,
    pub email: Option<String>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub invites: Arc<dyn InviteRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub legal: Arc<dyn LegalDocumentRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
    pub registration: RegistrationService,
    pub cases: CaseService,
    pub assignment: CaseAssignmentService,
    pub messages: MessageService,
    pub payments: PaymentService,
    pub avatar: AvatarService,
    pub seed: SeedService,
    pub seed_settings: SeedSettings,
    pub webhook_secrets: WebhookSecrets,
}
