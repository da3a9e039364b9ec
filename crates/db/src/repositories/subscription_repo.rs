//! Repository for the `subscriptions` table.

use plotwist_core::enums::SubscriptionStatus;
use plotwist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::subscription::{CreateSubscription, Subscription};

const COLUMNS: &str = "id, user_id, type, status, provider_subscription_id, created_at, \
                       canceled_at, cancellation_reason";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Insert an `ACTIVE` subscription.
    pub async fn insert(
        pool: &PgPool,
        input: &CreateSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, type, status, provider_subscription_id) \
             VALUES ($1, $2, 'ACTIVE', $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.user_id)
            .bind(input.subscription_type)
            .bind(&input.provider_subscription_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_active_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 AND status = 'ACTIVE'"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_provider_subscription_id(
        pool: &PgPool,
        provider_subscription_id: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE provider_subscription_id = $1 \
             ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(provider_subscription_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's newest subscription that is still running, including one
    /// scheduled to end.
    pub async fn latest_active_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status IN ('ACTIVE', 'PENDING_CANCELLATION') \
             ORDER BY created_at DESC LIMIT 1"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Returns the number of rows updated.
    pub async fn update_status_by_provider_subscription_id(
        pool: &PgPool,
        provider_subscription_id: &str,
        status: SubscriptionStatus,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions SET status = $2, \
                canceled_at = CASE WHEN $2 = 'CANCELED'::subscription_status \
                                   THEN COALESCE(canceled_at, NOW()) ELSE canceled_at END \
             WHERE provider_subscription_id = $1",
        )
        .bind(provider_subscription_id)
        .bind(status)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark a subscription canceled now.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        reason: Option<&str>,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET status = 'CANCELED', canceled_at = NOW(), \
                cancellation_reason = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    /// Mark a subscription as ending at `canceled_at`.
    pub async fn schedule_cancellation(
        pool: &PgPool,
        id: DbId,
        canceled_at: Timestamp,
        reason: Option<&str>,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET status = 'PENDING_CANCELLATION', canceled_at = $2, \
                cancellation_reason = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(id)
            .bind(canceled_at)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }
}
