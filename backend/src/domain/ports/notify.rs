//! Delivery channel ports: realtime push and transactional email.
//!
//! Both channels are best effort. Callers log failures and carry on; no
//! channel error ever propagates into an HTTP response.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::notification::Notification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by delivery channel adapters.
    pub enum NotifyError {
        /// The channel endpoint or credentials are not configured.
        NotConfigured => "delivery channel is not configured",
        /// Delivery was attempted and failed.
        Delivery { message: String } => "delivery failed: {message}",
    }
}

/// Driven port pushing notifications into the hosted realtime database.
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    /// Push one notification to the user's realtime channel.
    async fn push(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Outbound transactional email request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Driven port for transactional email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email.
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError>;
}

/// Realtime channel used when no provider is configured; logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRealtimeNotifier;

#[async_trait]
impl RealtimeNotifier for NoOpRealtimeNotifier {
    async fn push(&self, notification: &Notification) -> Result<(), NotifyError> {
        debug!(user_id = %notification.user_id, kind = %notification.kind, "realtime push skipped (no provider configured)");
        Ok(())
    }
}

/// Mailer used when no provider is configured; logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMailer;

#[async_trait]
impl Mailer for NoOpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        debug!(to = %email.to, subject = %email.subject, "email skipped (no provider configured)");
        Ok(())
    }
}
