//! Stripe subscription client.
//!
//! Only cancellation is driven from the backend; subscriptions are created
//! by Stripe Checkout and reported back through the webhook.

use async_trait::async_trait;
use plotwist_core::error::CoreError;
use serde::Deserialize;

use crate::read_failure;

/// Default Stripe API base URL.
pub const STRIPE_API_URL: &str = "https://api.stripe.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The subscription was already canceled on Stripe's side.
    #[error("Subscription is already canceled")]
    AlreadyCanceled,

    #[error("Stripe API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stripe secret key is not configured")]
    NotConfigured,
}

impl From<StripeError> for CoreError {
    fn from(err: StripeError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

/// Subscription management at the payment provider.
#[async_trait]
pub trait SubscriptionProvider: Send + Sync {
    /// End the subscription now.
    async fn cancel_immediately(&self, subscription_id: &str) -> Result<(), StripeError>;

    /// Let the subscription run until the end of the paid period.
    async fn schedule_cancel_at_period_end(&self, subscription_id: &str)
        -> Result<(), StripeError>;
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Classify a failed Stripe response body.
///
/// Canceling a subscription twice yields either `resource_missing` or a
/// message about a canceled subscription, depending on how long ago it ended.
fn classify_failure(status: u16, body: &str) -> StripeError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) else {
        return StripeError::Api {
            status,
            message: body.to_string(),
        };
    };
    let error = envelope.error;
    let already_canceled = error.code.as_deref() == Some("resource_missing")
        || error.message.to_lowercase().contains("canceled subscription");
    if already_canceled {
        StripeError::AlreadyCanceled
    } else {
        StripeError::Api {
            status,
            message: error.message,
        }
    }
}

/// HTTP client for the Stripe subscriptions API.
pub struct StripeClient {
    client: reqwest::Client,
    api_url: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), STRIPE_API_URL.to_string(), secret_key)
    }

    pub fn with_client(client: reqwest::Client, api_url: String, secret_key: Option<String>) -> Self {
        Self {
            client,
            api_url,
            secret_key: secret_key.filter(|k| !k.is_empty()),
        }
    }

    fn key(&self) -> Result<&str, StripeError> {
        self.secret_key.as_deref().ok_or(StripeError::NotConfigured)
    }

    async fn check(response: reqwest::Response) -> Result<(), StripeError> {
        if response.status().is_success() {
            return Ok(());
        }
        let (status, body) = read_failure(response).await;
        Err(classify_failure(status, &body))
    }
}

#[async_trait]
impl SubscriptionProvider for StripeClient {
    async fn cancel_immediately(&self, subscription_id: &str) -> Result<(), StripeError> {
        let response = self
            .client
            .delete(format!("{}/subscriptions/{subscription_id}", self.api_url))
            .bearer_auth(self.key()?)
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(subscription_id, "Stripe subscription canceled");
        Ok(())
    }

    async fn schedule_cancel_at_period_end(
        &self,
        subscription_id: &str,
    ) -> Result<(), StripeError> {
        let response = self
            .client
            .post(format!("{}/subscriptions/{subscription_id}", self.api_url))
            .bearer_auth(self.key()?)
            .form(&[("cancel_at_period_end", "true")])
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(subscription_id, "Stripe subscription set to cancel at period end");
        Ok(())
    }
}
