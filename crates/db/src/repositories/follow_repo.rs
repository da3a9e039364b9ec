//! Repository for the `followers` table.

use plotwist_core::pagination::{paginate, CursorPage};
use plotwist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::SUBSCRIPTION_TYPE_SQL;
use crate::models::follow::{Follow, FollowUser};

const COLUMNS: &str = "follower_id, followed_id, created_at";

pub struct FollowRepo;

impl FollowRepo {
    pub async fn insert(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<Follow, sqlx::Error> {
        let query = format!(
            "INSERT INTO followers (follower_id, followed_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Follow>(&query)
            .bind(follower_id)
            .bind(followed_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<Option<Follow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM followers WHERE follower_id = $1 AND followed_id = $2"
        );
        sqlx::query_as::<_, Follow>(&query)
            .bind(follower_id)
            .bind(followed_id)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a follow was removed.
    pub async fn delete(
        pool: &PgPool,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM followers WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Users following `followed_id`, newest follow first.
    pub async fn list_followers(
        pool: &PgPool,
        followed_id: DbId,
        cursor: Option<Timestamp>,
        page_size: i64,
    ) -> Result<CursorPage<FollowUser>, sqlx::Error> {
        Self::page(pool, "f.followed_id", "f.follower_id", followed_id, cursor, page_size).await
    }

    /// Users followed by `follower_id`, newest follow first.
    pub async fn list_following(
        pool: &PgPool,
        follower_id: DbId,
        cursor: Option<Timestamp>,
        page_size: i64,
    ) -> Result<CursorPage<FollowUser>, sqlx::Error> {
        Self::page(pool, "f.follower_id", "f.followed_id", follower_id, cursor, page_size).await
    }

    async fn page(
        pool: &PgPool,
        filter_col: &str,
        other_col: &str,
        id: DbId,
        cursor: Option<Timestamp>,
        page_size: i64,
    ) -> Result<CursorPage<FollowUser>, sqlx::Error> {
        let query = format!(
            "SELECT f.follower_id, f.followed_id, f.created_at, \
                    u.id AS user_id, u.username, u.display_name, u.avatar_url, \
                    {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM followers f \
             JOIN users u ON u.id = {other_col} \
             WHERE {filter_col} = $1 \
               AND u.deleted_at IS NULL \
               AND ($2::timestamptz IS NULL OR DATE_TRUNC('milliseconds', f.created_at) <= $2) \
             ORDER BY f.created_at DESC \
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, FollowUser>(&query)
            .bind(id)
            .bind(cursor)
            .bind(page_size + 1)
            .fetch_all(pool)
            .await?;
        Ok(paginate(rows, page_size, |row| row.created_at))
    }

    pub async fn count_followers(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM followers WHERE followed_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_following(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM followers WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Ids of every user `follower_id` follows, for the network feed.
    pub async fn followed_ids(pool: &PgPool, follower_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT followed_id FROM followers WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_all(pool)
            .await
    }
}
