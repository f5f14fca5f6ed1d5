//! Backend entry-point: wires the REST API, webhook endpoints, and OpenAPI docs.

mod server;

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use reqwest::Url;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::seed::SeedSettings;
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::WebhookSecrets;
use backend::middleware::rate_limit::RateLimitConfig;
use backend::outbound::persistence::{DbPool, PoolConfig};

use server::{ProviderSettings, ServerConfig};

fn env_url(name: &str) -> Option<Url> {
    let raw = env::var(name).ok()?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(var = name, error = %e, "ignoring malformed URL");
            None
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring unparseable value");
            None
        }
    }
}

fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn load_providers() -> ProviderSettings {
    ProviderSettings {
        realtime_url: env_url("REALTIME_URL"),
        realtime_token: env::var("REALTIME_AUTH_TOKEN").ok(),
        email_url: env_url("EMAIL_API_URL"),
        email_api_key: env::var("EMAIL_API_KEY").ok(),
        email_sender: env::var("EMAIL_SENDER")
            .unwrap_or_else(|_| "noreply@visaflow.example".into()),
        payment_url: env_url("PAYMENT_API_URL"),
        payment_secret_key: env::var("PAYMENT_SECRET_KEY").ok(),
        storage_api_key: env::var("STORAGE_API_KEY").ok(),
    }
}

fn load_seed_settings() -> SeedSettings {
    let mut settings = SeedSettings {
        enabled: env::var("SEED_ON_STARTUP").ok().as_deref() == Some("1"),
        ..SeedSettings::default()
    };
    if let Ok(name) = env::var("SEED_NAME") {
        settings.seed_name = name;
    }
    settings
}

fn load_rate_limit() -> RateLimitConfig {
    let mut config = RateLimitConfig::default();
    if let Some(max) = env_parse::<u32>("RATE_LIMIT_MAX_REQUESTS") {
        config.max_requests = max;
    }
    if let Some(secs) = env_parse::<u64>("RATE_LIMIT_WINDOW_SECS") {
        config.window = Duration::from_secs(secs);
    }
    config
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env_parse("BIND_ADDR").unwrap_or(([0, 0, 0, 0], 8080).into());
    let seed_settings = load_seed_settings();

    let config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr, pool.clone())
        .with_cors_origin(env::var("CORS_ALLOWED_ORIGIN").ok())
        .with_rate_limit(load_rate_limit())
        .with_webhook_secrets(WebhookSecrets {
            payments: env::var("PAYMENT_WEBHOOK_SECRET").ok(),
            email: env::var("EMAIL_WEBHOOK_SECRET").ok(),
        })
        .with_providers(load_providers())
        .with_seed(seed_settings.clone());

    if seed_settings.enabled {
        run_startup_seed(pool, &seed_settings).await;
    }

    let health_state = web::Data::new(HealthState::new());
    let server = server::create_server(health_state, config)?;
    info!(addr = %bind_addr, "listening");
    server.await
}

/// Plant startup fixtures; a failed run logs but never blocks boot.
async fn run_startup_seed(pool: DbPool, settings: &SeedSettings) {
    use std::sync::Arc;

    use backend::domain::seed::SeedService;
    use backend::outbound::persistence::{
        DieselCaseRepository, DieselNotificationRepository, DieselSeedRunsRepository,
        DieselUserRepository,
    };

    let service = SeedService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselCaseRepository::new(pool.clone())),
        Arc::new(DieselNotificationRepository::new(pool.clone())),
        Arc::new(DieselSeedRunsRepository::new(pool)),
    );
    match service.run(settings).await {
        Ok(outcome) => info!(?outcome, "startup seed finished"),
        Err(e) => error!(error = %e, "startup seed failed"),
    }
}
