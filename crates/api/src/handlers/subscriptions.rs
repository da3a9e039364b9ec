//! Handlers for the user's subscription and the Stripe webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Datelike, Utc};
use plotwist_core::error::CoreError;
use plotwist_core::types::DbId;
use plotwist_core::webhook_signature::{verify_stripe_signature, DEFAULT_TOLERANCE_SECS};
use plotwist_db::models::subscription::Subscription;
use plotwist_db::repositories::SubscriptionRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::subscriptions::{self, WebhookEvent};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CurrentSubscription {
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelWhen {
    #[default]
    Now,
    AtPeriodEnd,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
    #[serde(default)]
    pub when: CancelWhen,
    /// Day of the month the subscription renews. Defaults to the day it
    /// started.
    pub payment_day: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CancelResult {
    pub id: DbId,
}

/// GET /api/v1/subscription
pub async fn get_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<CurrentSubscription>>> {
    let subscription = SubscriptionRepo::latest_active_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CurrentSubscription { subscription },
    }))
}

/// DELETE /api/v1/subscription
pub async fn cancel_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CancelRequest>,
) -> AppResult<Json<DataResponse<CancelResult>>> {
    let subscription = SubscriptionRepo::find_active_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(CoreError::no_active_subscription)?;

    let id = match input.when {
        CancelWhen::Now => {
            subscriptions::cancel_subscription(
                &state.pool,
                state.subscriptions.as_ref(),
                &subscription,
                input.reason.as_deref(),
            )
            .await?
        }
        CancelWhen::AtPeriodEnd => {
            let payment_day = input
                .payment_day
                .unwrap_or_else(|| subscription.created_at.day());
            if !(1..=31).contains(&payment_day) {
                return Err(AppError::BadRequest(
                    "payment_day must be between 1 and 31".into(),
                ));
            }
            subscriptions::schedule_cancellation(
                &state.pool,
                state.subscriptions.as_ref(),
                &subscription,
                payment_day,
                input.reason.as_deref(),
                Utc::now().date_naive(),
            )
            .await?
            .id
        }
    };

    Ok(Json(DataResponse {
        data: CancelResult { id },
    }))
}

/// POST /api/v1/stripe-webhook
///
/// Verifies the `stripe-signature` header against the raw body before
/// applying the event. Responds `{"received": true}` without the data
/// envelope, as Stripe expects.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing stripe-signature header".into()))?;

    let secret = state
        .config
        .stripe_webhook_secret
        .as_deref()
        .ok_or_else(|| AppError::InternalError("Stripe webhook secret is not configured".into()))?;

    verify_stripe_signature(
        signature,
        &body,
        secret,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected Stripe webhook");
        AppError::BadRequest(format!("Webhook Error: {e}"))
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    tracing::info!(event_type = %event.event_type, "Stripe webhook received");
    subscriptions::handle_webhook_event(&state.pool, &event).await?;

    Ok(Json(json!({ "received": true })))
}
