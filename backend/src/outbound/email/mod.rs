//! Reqwest-backed transactional email adapter.
//!
//! Sends plain-text email through the hosted email provider's HTTP API.
//! Delivery is best effort; callers decide whether a failure matters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ports::{Mailer, NotifyError, OutboundEmail};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Wire payload accepted by the provider's send endpoint.
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mailer that POSTs send requests to the email provider.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: String,
    sender: String,
}

impl HttpMailer {
    /// Build an adapter for the given provider endpoint.
    ///
    /// `sender` is the from-address stamped on every message.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            sender: sender.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let payload = SendRequest {
            from: &self.sender,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotifyError::delivery(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::delivery(format!(
                "email provider returned {status}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn send_requests_carry_the_configured_sender() {
        let payload = SendRequest {
            from: "noreply@visaflow.example",
            to: "ana@example.com",
            subject: "Case update",
            text: "Your case moved to in_review.",
        };

        let value = serde_json::to_value(&payload).expect("payload should serialise");
        assert_eq!(
            value.get("from").and_then(|v| v.as_str()),
            Some("noreply@visaflow.example")
        );
        assert_eq!(
            value.get("subject").and_then(|v| v.as_str()),
            Some("Case update")
        );
    }
}
