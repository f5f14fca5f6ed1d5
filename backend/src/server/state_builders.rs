//! Builders for HTTP state: repositories, providers, and domain services.

use std::sync::Arc;

use tracing::warn;

use backend::domain::assignment::CaseAssignmentService;
use backend::domain::avatar::AvatarService;
use backend::domain::billing::PaymentService;
use backend::domain::case_service::CaseService;
use backend::domain::messaging::MessageService;
use backend::domain::notification::NotificationFanout;
use backend::domain::ports::{
    FileStorage, Mailer, NoOpFileStorage, NoOpMailer, NoOpRealtimeNotifier, PaymentGateway,
    RealtimeNotifier, UnconfiguredPaymentGateway,
};
use backend::domain::registration::RegistrationService;
use backend::domain::seed::SeedService;
use backend::inbound::http::state::HttpState;
use backend::outbound::billing::HttpPaymentGateway;
use backend::outbound::email::HttpMailer;
use backend::outbound::persistence::{
    DieselActivityLogRepository, DieselCaseRepository, DieselInviteRepository,
    DieselLegalRepository, DieselLoginService, DieselMessageRepository,
    DieselNotificationRepository, DieselPaymentRepository, DieselSeedRunsRepository,
    DieselTemplateRepository, DieselTransferLogRepository, DieselUserRepository,
};
use backend::outbound::realtime::HttpRealtimeNotifier;
use backend::outbound::storage::HttpFileStorage;

use super::config::{ProviderSettings, ServerConfig};

/// Build the realtime channel, falling back to the no-op port when the
/// provider is not fully configured.
fn build_realtime(providers: &ProviderSettings) -> Arc<dyn RealtimeNotifier> {
    match (&providers.realtime_url, &providers.realtime_token) {
        (Some(url), Some(token)) => match HttpRealtimeNotifier::new(url.clone(), token.clone()) {
            Ok(notifier) => Arc::new(notifier),
            Err(error) => {
                warn!(%error, "realtime client construction failed, pushes disabled");
                Arc::new(NoOpRealtimeNotifier)
            }
        },
        _ => {
            warn!("realtime provider not configured, pushes disabled");
            Arc::new(NoOpRealtimeNotifier)
        }
    }
}

fn build_mailer(providers: &ProviderSettings) -> Arc<dyn Mailer> {
    match (&providers.email_url, &providers.email_api_key) {
        (Some(url), Some(key)) => {
            match HttpMailer::new(url.clone(), key.clone(), providers.email_sender.clone()) {
                Ok(mailer) => Arc::new(mailer),
                Err(error) => {
                    warn!(%error, "mailer construction failed, email disabled");
                    Arc::new(NoOpMailer)
                }
            }
        }
        _ => {
            warn!("email provider not configured, email disabled");
            Arc::new(NoOpMailer)
        }
    }
}

/// Build the payment gateway. Unlike the notification channels, a missing
/// provider keeps failing loudly: payment creation returns 503.
fn build_gateway(providers: &ProviderSettings) -> Arc<dyn PaymentGateway> {
    match (&providers.payment_url, &providers.payment_secret_key) {
        (Some(url), Some(key)) => match HttpPaymentGateway::new(url.clone(), key.clone()) {
            Ok(gateway) => Arc::new(gateway),
            Err(error) => {
                warn!(%error, "payment gateway construction failed, payments unavailable");
                Arc::new(UnconfiguredPaymentGateway)
            }
        },
        _ => {
            warn!("payment provider not configured, payments unavailable");
            Arc::new(UnconfiguredPaymentGateway)
        }
    }
}

fn build_storage(providers: &ProviderSettings) -> Arc<dyn FileStorage> {
    match &providers.storage_api_key {
        Some(key) => match HttpFileStorage::new(key.clone()) {
            Ok(storage) => Arc::new(storage),
            Err(error) => {
                warn!(%error, "storage client construction failed, file deletes skipped");
                Arc::new(NoOpFileStorage)
            }
        },
        None => {
            warn!("storage provider not configured, file deletes skipped");
            Arc::new(NoOpFileStorage)
        }
    }
}

/// Assemble the full HTTP state over Diesel repositories and the configured
/// providers.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let pool = config.db_pool.clone();

    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let cases = Arc::new(DieselCaseRepository::new(pool.clone()));
    let messages = Arc::new(DieselMessageRepository::new(pool.clone()));
    let notifications = Arc::new(DieselNotificationRepository::new(pool.clone()));
    let invites = Arc::new(DieselInviteRepository::new(pool.clone()));
    let templates = Arc::new(DieselTemplateRepository::new(pool.clone()));
    let legal = Arc::new(DieselLegalRepository::new(pool.clone()));
    let payments = Arc::new(DieselPaymentRepository::new(pool.clone()));
    let transfers = Arc::new(DieselTransferLogRepository::new(pool.clone()));
    let activity = Arc::new(DieselActivityLogRepository::new(pool.clone()));
    let seed_runs = Arc::new(DieselSeedRunsRepository::new(pool.clone()));
    let login = Arc::new(DieselLoginService::new(pool));

    let realtime = build_realtime(&config.providers);
    let mailer = build_mailer(&config.providers);
    let gateway = build_gateway(&config.providers);
    let storage = build_storage(&config.providers);

    let fanout = NotificationFanout::new(notifications.clone(), realtime, mailer);

    HttpState {
        login,
        users: users.clone(),
        notifications: notifications.clone(),
        invites: invites.clone(),
        templates,
        legal,
        activity: activity.clone(),
        registration: RegistrationService::new(invites, users.clone(), fanout.clone()),
        cases: CaseService::new(cases.clone(), activity.clone(), fanout.clone()),
        assignment: CaseAssignmentService::new(
            cases.clone(),
            users.clone(),
            transfers,
            activity.clone(),
            fanout.clone(),
        ),
        messages: MessageService::new(messages, cases.clone(), users.clone(), fanout.clone()),
        payments: PaymentService::new(payments, gateway, cases.clone(), activity, fanout),
        avatar: AvatarService::new(users.clone(), storage),
        seed: SeedService::new(users, cases, notifications, seed_runs),
        seed_settings: config.seed.clone(),
        webhook_secrets: config.webhook_secrets.clone(),
    }
}
