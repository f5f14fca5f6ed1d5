//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use reqwest::Url;

use backend::domain::seed::SeedSettings;
use backend::inbound::http::state::WebhookSecrets;
use backend::middleware::rate_limit::RateLimitConfig;
use backend::outbound::persistence::DbPool;

/// Endpoint and credential settings for the hosted providers.
///
/// Every field is optional; a missing endpoint or credential degrades that
/// provider to its no-op (or unconfigured) port implementation.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Realtime database base URL.
    pub realtime_url: Option<Url>,
    /// Realtime database auth token.
    pub realtime_token: Option<String>,
    /// Email provider send endpoint.
    pub email_url: Option<Url>,
    /// Email provider API key.
    pub email_api_key: Option<String>,
    /// From-address stamped on outbound mail.
    pub email_sender: String,
    /// Payment provider intent endpoint.
    pub payment_url: Option<Url>,
    /// Payment provider secret key.
    pub payment_secret_key: Option<String>,
    /// Upload provider API key used for deletes.
    pub storage_api_key: Option<String>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) cors_origin: Option<String>,
    pub(crate) rate_limit: RateLimitConfig,
    pub(crate) webhook_secrets: WebhookSecrets,
    pub(crate) providers: ProviderSettings,
    pub(crate) seed: SeedSettings,
}

impl ServerConfig {
    /// Construct a server configuration with default middleware settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            cors_origin: None,
            rate_limit: RateLimitConfig::default(),
            webhook_secrets: WebhookSecrets::default(),
            providers: ProviderSettings::default(),
            seed: SeedSettings::default(),
        }
    }

    /// Restrict CORS to the given browser origin.
    ///
    /// Without an origin the server only accepts same-origin browser calls.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: Option<String>) -> Self {
        self.cors_origin = origin;
        self
    }

    /// Override the per-peer rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Attach shared secrets for the webhook endpoints.
    #[must_use]
    pub fn with_webhook_secrets(mut self, secrets: WebhookSecrets) -> Self {
        self.webhook_secrets = secrets;
        self
    }

    /// Attach hosted provider settings.
    #[must_use]
    pub fn with_providers(mut self, providers: ProviderSettings) -> Self {
        self.providers = providers;
        self
    }

    /// Attach startup seeding settings.
    #[must_use]
    pub fn with_seed(mut self, seed: SeedSettings) -> Self {
        self.seed = seed;
        self
    }
}
