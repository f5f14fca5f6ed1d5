//! Reqwest-backed payment gateway adapter.
//!
//! Creates payment intents with the card provider. The browser completes the
//! payment with the returned client secret; settlement lands back on the
//! payment webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::domain::ports::{PaymentGateway, PaymentGatewayError, PaymentIntent};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Subset of the provider's intent response this adapter needs.
#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: String,
}

/// Payment gateway that creates intents over the provider's HTTP API.
pub struct HttpPaymentGateway {
    client: Client,
    endpoint: Url,
    secret_key: String,
}

impl HttpPaymentGateway {
    /// Build an adapter for the given provider endpoint and secret key.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, secret_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint,
            secret_key: secret_key.into(),
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        reference: &str,
    ) -> Result<PaymentIntent, PaymentGatewayError> {
        let amount = amount_cents.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("description", reference),
        ];

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|err| PaymentGatewayError::provider(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaymentGatewayError::provider(format!(
                "payment provider returned {status}"
            )));
        }

        let intent: IntentResponse = response
            .json()
            .await
            .map_err(|err| PaymentGatewayError::provider(format!("malformed response: {err}")))?;

        Ok(PaymentIntent {
            provider_ref: intent.id,
            client_secret: intent.client_secret,
        })
    }
}
