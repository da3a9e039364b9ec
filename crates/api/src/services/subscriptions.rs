//! Subscription cancellation and Stripe webhook handling.

use chrono::{NaiveDate, TimeZone, Utc};
use plotwist_core::enums::{SubscriptionStatus, SubscriptionType};
use plotwist_core::error::CoreError;
use plotwist_core::subscriptions::cancellation_date;
use plotwist_core::types::DbId;
use plotwist_db::models::subscription::{CreateSubscription, Subscription};
use plotwist_db::pg_errors::is_unique_violation;
use plotwist_db::repositories::{SubscriptionRepo, UserRepo};
use plotwist_providers::stripe::{StripeError, SubscriptionProvider};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

fn provider_id(subscription: &Subscription) -> AppResult<&str> {
    subscription.provider_subscription_id.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Cannot cancel: subscription has no provider subscription id".into(),
        ))
    })
}

/// End a subscription now, at the provider and locally.
pub async fn cancel_subscription(
    pool: &PgPool,
    provider: &dyn SubscriptionProvider,
    subscription: &Subscription,
    reason: Option<&str>,
) -> AppResult<DbId> {
    let provider_subscription_id = provider_id(subscription)?;

    match provider.cancel_immediately(provider_subscription_id).await {
        Ok(()) => {}
        Err(StripeError::AlreadyCanceled) => {
            tracing::info!(
                subscription_id = %subscription.id,
                "Subscription already canceled at the provider"
            );
        }
        Err(e) => return Err(CoreError::from(e).into()),
    }

    let canceled = SubscriptionRepo::cancel(pool, subscription.id, reason)
        .await?
        .ok_or_else(CoreError::subscription_not_found)?;

    tracing::info!(subscription_id = %canceled.id, user_id = %canceled.user_id, "Subscription canceled");
    Ok(canceled.id)
}

/// Let a subscription run until the day before its next payment.
pub async fn schedule_cancellation(
    pool: &PgPool,
    provider: &dyn SubscriptionProvider,
    subscription: &Subscription,
    payment_day: u32,
    reason: Option<&str>,
    today: NaiveDate,
) -> AppResult<Subscription> {
    let provider_subscription_id = provider_id(subscription)?;
    provider
        .schedule_cancel_at_period_end(provider_subscription_id)
        .await
        .map_err(CoreError::from)?;

    let ends_on = cancellation_date(today, payment_day);
    let canceled_at = Utc.from_utc_datetime(&ends_on.and_hms_opt(0, 0, 0).unwrap_or_default());

    let scheduled = SubscriptionRepo::schedule_cancellation(pool, subscription.id, canceled_at, reason)
        .await?
        .ok_or_else(CoreError::subscription_not_found)?;

    tracing::info!(
        subscription_id = %scheduled.id,
        canceled_at = %canceled_at,
        "Subscription cancellation scheduled"
    );
    Ok(scheduled)
}

// ---------------------------------------------------------------------------
// Webhook events
// ---------------------------------------------------------------------------

/// The parts of a Stripe event the backend reads.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    customer_email: Option<String>,
    #[serde(default)]
    customer_details: Option<CustomerDetails>,
    #[serde(default)]
    subscription: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeSubscription {
    id: String,
    #[serde(default)]
    cancel_at_period_end: bool,
}

fn parse_object<T: serde::de::DeserializeOwned>(event: &WebhookEvent) -> AppResult<T> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        AppError::BadRequest(format!("Invalid {} payload: {e}", event.event_type))
    })
}

/// Apply a verified webhook event to local subscription state.
pub async fn handle_webhook_event(pool: &PgPool, event: &WebhookEvent) -> AppResult<()> {
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSession = parse_object(event)?;
            checkout_completed(pool, session).await
        }
        "customer.subscription.deleted" => {
            let sub: StripeSubscription = parse_object(event)?;
            let updated = SubscriptionRepo::update_status_by_provider_subscription_id(
                pool,
                &sub.id,
                SubscriptionStatus::Canceled,
            )
            .await?;
            tracing::info!(provider_subscription_id = %sub.id, updated, "Subscription deleted at provider");
            Ok(())
        }
        "customer.subscription.updated" => {
            let sub: StripeSubscription = parse_object(event)?;
            let status = if sub.cancel_at_period_end {
                SubscriptionStatus::PendingCancellation
            } else {
                SubscriptionStatus::Active
            };
            let updated = match SubscriptionRepo::update_status_by_provider_subscription_id(
                pool, &sub.id, status,
            )
            .await
            {
                Ok(updated) => updated,
                // The user already holds another active subscription.
                Err(e) if is_unique_violation(&e) => {
                    tracing::warn!(
                        provider_subscription_id = %sub.id,
                        status = %status,
                        "Skipping status update that conflicts with an active subscription"
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            tracing::info!(
                provider_subscription_id = %sub.id,
                status = %status,
                updated,
                "Subscription updated at provider"
            );
            Ok(())
        }
        other => {
            tracing::info!(event_type = other, "Ignoring Stripe event");
            Ok(())
        }
    }
}

async fn checkout_completed(pool: &PgPool, session: CheckoutSession) -> AppResult<()> {
    if session.mode.as_deref() != Some("subscription") {
        tracing::debug!(mode = ?session.mode, "Ignoring non-subscription checkout");
        return Ok(());
    }

    let email = session
        .customer_email
        .or_else(|| session.customer_details.and_then(|d| d.email));
    let Some(email) = email else {
        tracing::warn!("Checkout session without customer email");
        return Ok(());
    };

    let Some(user) = UserRepo::find_by_email(pool, &email).await? else {
        tracing::warn!(email = %email, "Checkout completed for unknown user");
        return Ok(());
    };

    if SubscriptionRepo::find_active_by_user(pool, user.id).await?.is_some() {
        tracing::info!(user_id = %user.id, "User already has an active subscription");
        return Ok(());
    }

    let input = CreateSubscription {
        user_id: user.id,
        subscription_type: SubscriptionType::Pro,
        provider_subscription_id: session.subscription,
    };
    match SubscriptionRepo::insert(pool, &input).await {
        Ok(subscription) => {
            tracing::info!(
                user_id = %user.id,
                subscription_id = %subscription.id,
                "PRO subscription started"
            );
            Ok(())
        }
        // A concurrent delivery of the same event already inserted it.
        Err(e) if is_unique_violation(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
