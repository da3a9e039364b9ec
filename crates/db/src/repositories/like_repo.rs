//! Repository for the `likes` table.

use plotwist_core::types::DbId;
use sqlx::PgPool;

use super::SUBSCRIPTION_TYPE_SQL;
use crate::models::like::{CreateLike, Like};
use crate::models::user::UserSummary;

const COLUMNS: &str = "id, entity_type, entity_id, user_id, created_at";

pub struct LikeRepo;

impl LikeRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateLike,
    ) -> Result<Like, sqlx::Error> {
        let query = format!(
            "INSERT INTO likes (entity_type, entity_id, user_id) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Like>(&query)
            .bind(input.entity_type)
            .bind(input.entity_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Like>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM likes WHERE id = $1");
        sqlx::query_as::<_, Like>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a like owned by `user_id`, returning the removed row.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Like>, sqlx::Error> {
        let query =
            format!("DELETE FROM likes WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Like>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Users who liked an entity, most recent first.
    pub async fn list_by_entity(
        pool: &PgPool,
        entity_id: DbId,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        let query = format!(
            "SELECT u.id, u.username, u.display_name, u.avatar_url, \
                    {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM likes l \
             JOIN users u ON u.id = l.user_id \
             WHERE l.entity_id = $1 AND u.deleted_at IS NULL \
             ORDER BY l.created_at DESC"
        );
        sqlx::query_as::<_, UserSummary>(&query)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_entity(pool: &PgPool, entity_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE entity_id = $1")
            .bind(entity_id)
            .fetch_one(pool)
            .await
    }
}
