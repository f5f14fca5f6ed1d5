//! Reqwest-backed realtime notifier adapter.
//!
//! Pushes notification payloads into the hosted realtime database over its
//! REST surface. The browser client subscribes to `channels/{user_id}` and
//! renders whatever lands there; this adapter owns transport details only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::notification::Notification;
use crate::domain::ports::{NotifyError, RealtimeNotifier};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire payload written to the user's realtime channel.
#[derive(Debug, Serialize)]
struct ChannelEvent<'a> {
    id: String,
    kind: &'a str,
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    case_id: Option<String>,
    created_at: String,
}

impl<'a> ChannelEvent<'a> {
    fn from_notification(notification: &'a Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            kind: notification.kind.as_str(),
            title: &notification.title,
            body: &notification.body,
            case_id: notification.case_id.as_ref().map(ToString::to_string),
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

/// Realtime notifier that POSTs channel events to the hosted database.
pub struct HttpRealtimeNotifier {
    client: Client,
    base_url: Url,
    auth_token: String,
}

impl HttpRealtimeNotifier {
    /// Build an adapter for the given database URL and auth token.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, auth_token: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url,
            auth_token: auth_token.into(),
        })
    }

    fn channel_url(&self, user_id: &str) -> Result<Url, NotifyError> {
        self.base_url
            .join(&format!("channels/{user_id}.json"))
            .map_err(|err| NotifyError::delivery(err.to_string()))
    }
}

#[async_trait]
impl RealtimeNotifier for HttpRealtimeNotifier {
    async fn push(&self, notification: &Notification) -> Result<(), NotifyError> {
        let url = self.channel_url(&notification.user_id.to_string())?;
        let event = ChannelEvent::from_notification(notification);

        let response = self
            .client
            .post(url)
            .query(&[("auth", self.auth_token.as_str())])
            .json(&event)
            .send()
            .await
            .map_err(|err| NotifyError::delivery(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::delivery(format!(
                "realtime endpoint returned {status}"
            )));
        }
        Ok(())
    }
}
