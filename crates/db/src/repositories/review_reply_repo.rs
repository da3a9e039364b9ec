//! Repository for the `review_replies` table.

use plotwist_core::types::DbId;
use sqlx::PgPool;

use super::user_summary_json;
use crate::models::review::{CreateReply, ReplyWithStats, ReviewReply};

const COLUMNS: &str = "id, user_id, review_id, reply, created_at";

pub struct ReviewReplyRepo;

impl ReviewReplyRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReply,
    ) -> Result<ReviewReply, sqlx::Error> {
        let query = format!(
            "INSERT INTO review_replies (user_id, review_id, reply) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewReply>(&query)
            .bind(user_id)
            .bind(input.review_id)
            .bind(&input.reply)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ReviewReply>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM review_replies WHERE id = $1");
        sqlx::query_as::<_, ReviewReply>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replies to a review, oldest first, with like counters for `viewer_id`.
    pub async fn list_by_review(
        pool: &PgPool,
        review_id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Vec<ReplyWithStats>, sqlx::Error> {
        let query = format!(
            "SELECT rr.id, rr.user_id, rr.review_id, rr.reply, rr.created_at, \
                    {user} AS user, \
                    (SELECT COUNT(*) FROM likes l \
                      WHERE l.entity_type = 'REPLY' AND l.entity_id = rr.id) AS like_count, \
                    EXISTS (SELECT 1 FROM likes l \
                      WHERE l.entity_type = 'REPLY' AND l.entity_id = rr.id \
                        AND l.user_id = $2) AS user_liked \
             FROM review_replies rr \
             JOIN users u ON u.id = rr.user_id \
             WHERE rr.review_id = $1 \
             ORDER BY rr.created_at ASC",
            user = user_summary_json()
        );
        sqlx::query_as::<_, ReplyWithStats>(&query)
            .bind(review_id)
            .bind(viewer_id)
            .fetch_all(pool)
            .await
    }

    /// Update a reply owned by `user_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        reply: &str,
    ) -> Result<Option<ReviewReply>, sqlx::Error> {
        let query = format!(
            "UPDATE review_replies SET reply = $3 WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReviewReply>(&query)
            .bind(id)
            .bind(user_id)
            .bind(reply)
            .fetch_optional(pool)
            .await
    }

    /// Delete a reply owned by `user_id`.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM review_replies WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
