//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod activity_log;
mod case_repository;
mod file_storage;
mod invite_repository;
mod legal_repository;
mod login_service;
mod message_repository;
mod notification_repository;
mod notify;
mod payment_gateway;
mod payment_repository;
mod seed_runs;
mod template_repository;
mod transfer_log;
mod user_repository;

pub use activity_log::{ActivityListFilter, ActivityLogError, ActivityLogRepository};
pub use case_repository::{CaseListFilter, CasePersistenceError, CaseRepository};
pub use file_storage::{FileStorage, NoOpFileStorage, StorageError};
pub use invite_repository::{InvitePersistenceError, InviteRepository};
pub use legal_repository::{LegalDocumentRepository, LegalPersistenceError};
pub use login_service::LoginService;
pub use message_repository::{MessagePersistenceError, MessageRepository};
pub use notification_repository::{NotificationPersistenceError, NotificationRepository};
pub use notify::{Mailer, NoOpMailer, NoOpRealtimeNotifier, NotifyError, OutboundEmail, RealtimeNotifier};
pub use payment_gateway::{
    PaymentGateway, PaymentGatewayError, PaymentIntent, UnconfiguredPaymentGateway,
};
pub use payment_repository::{PaymentPersistenceError, PaymentRepository};
pub use seed_runs::{SeedRun, SeedRunsError, SeedRunsRepository};
pub use template_repository::{TemplatePersistenceError, TemplateRepository};
pub use transfer_log::{TransferLogError, TransferLogRepository};
pub use user_repository::{UserPersistenceError, UserRepository};
