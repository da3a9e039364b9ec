//! Repository for the `watch_entries` table.

use plotwist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user_item::WatchEntry;

const COLUMNS: &str = "id, user_item_id, watched_at, created_at";

pub struct WatchEntryRepo;

impl WatchEntryRepo {
    /// Record a viewing. `watched_at` defaults to now.
    pub async fn create(
        pool: &PgPool,
        user_item_id: DbId,
        watched_at: Option<Timestamp>,
    ) -> Result<WatchEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO watch_entries (user_item_id, watched_at) \
             VALUES ($1, COALESCE($2, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WatchEntry>(&query)
            .bind(user_item_id)
            .bind(watched_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WatchEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM watch_entries WHERE id = $1");
        sqlx::query_as::<_, WatchEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Viewings of an item, most recent first.
    pub async fn list_by_user_item(
        pool: &PgPool,
        user_item_id: DbId,
    ) -> Result<Vec<WatchEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM watch_entries WHERE user_item_id = $1 ORDER BY watched_at DESC"
        );
        sqlx::query_as::<_, WatchEntry>(&query)
            .bind(user_item_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        watched_at: Timestamp,
    ) -> Result<Option<WatchEntry>, sqlx::Error> {
        let query =
            format!("UPDATE watch_entries SET watched_at = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, WatchEntry>(&query)
            .bind(id)
            .bind(watched_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM watch_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove every viewing of an item. Returns how many were removed.
    pub async fn delete_by_user_item(pool: &PgPool, user_item_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM watch_entries WHERE user_item_id = $1")
            .bind(user_item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_by_user_item(pool: &PgPool, user_item_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM watch_entries WHERE user_item_id = $1")
            .bind(user_item_id)
            .fetch_one(pool)
            .await
    }
}
