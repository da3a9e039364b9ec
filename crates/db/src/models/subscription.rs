//! Subscription models.

use plotwist_core::enums::{SubscriptionStatus, SubscriptionType};
use plotwist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub subscription_type: SubscriptionType,
    pub status: SubscriptionStatus,
    pub provider_subscription_id: Option<String>,
    pub created_at: Timestamp,
    pub canceled_at: Option<Timestamp>,
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub user_id: DbId,
    pub subscription_type: SubscriptionType,
    pub provider_subscription_id: Option<String>,
}
