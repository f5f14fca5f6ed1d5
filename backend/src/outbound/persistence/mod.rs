//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! Adapters here are thin translators: Diesel row structs (`models.rs`) and
//! the schema definitions (`schema.rs`) stay internal, and every database
//! error is mapped into the owning port's error type. No business logic
//! lives in this module.

pub(crate) mod diesel_helpers;

mod diesel_activity_log_repository;
mod diesel_case_repository;
mod diesel_invite_repository;
mod diesel_legal_repository;
mod diesel_login_service;
mod diesel_message_repository;
mod diesel_notification_repository;
mod diesel_payment_repository;
mod diesel_seed_runs_repository;
mod diesel_template_repository;
mod diesel_transfer_log_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_activity_log_repository::DieselActivityLogRepository;
pub use diesel_case_repository::DieselCaseRepository;
pub use diesel_invite_repository::DieselInviteRepository;
pub use diesel_legal_repository::DieselLegalRepository;
pub use diesel_login_service::DieselLoginService;
pub use diesel_message_repository::DieselMessageRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_seed_runs_repository::DieselSeedRunsRepository;
pub use diesel_template_repository::DieselTemplateRepository;
pub use diesel_transfer_log_repository::DieselTransferLogRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
