//! Repository for `import_queue_messages`, a small Postgres-backed queue.
//!
//! Messages are leased rather than removed on receive: a received message
//! becomes invisible until `locked_until` and is redelivered afterwards
//! unless the consumer deletes it.

use std::time::Duration;

use plotwist_core::types::DbId;
use sqlx::PgPool;

use crate::models::import::QueueMessage;

pub struct ImportQueueRepo;

impl ImportQueueRepo {
    pub async fn enqueue(
        pool: &PgPool,
        queue: &str,
        body: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO import_queue_messages (queue, body) VALUES ($1, $2) RETURNING id",
        )
        .bind(queue)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    /// Enqueue a batch of messages with one statement.
    pub async fn enqueue_many(
        pool: &PgPool,
        queue: &str,
        bodies: &[serde_json::Value],
    ) -> Result<u64, sqlx::Error> {
        if bodies.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "INSERT INTO import_queue_messages (queue, body) \
             SELECT $1, b FROM UNNEST($2::jsonb[]) AS b",
        )
        .bind(queue)
        .bind(bodies)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Lease up to `max` visible messages, oldest first.
    ///
    /// Uses `FOR UPDATE SKIP LOCKED` so concurrent consumers never receive
    /// the same message twice within one visibility window.
    pub async fn receive(
        pool: &PgPool,
        queue: &str,
        max: i64,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, sqlx::Error> {
        sqlx::query_as::<_, QueueMessage>(
            "UPDATE import_queue_messages \
             SET locked_until = NOW() + make_interval(secs => $3), \
                 receive_count = receive_count + 1 \
             WHERE id IN ( \
                 SELECT id FROM import_queue_messages \
                 WHERE queue = $1 AND (locked_until IS NULL OR locked_until <= NOW()) \
                 ORDER BY enqueued_at \
                 LIMIT $2 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING id, queue, body, enqueued_at, receive_count",
        )
        .bind(queue)
        .bind(max)
        .bind(visibility.as_secs_f64())
        .fetch_all(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM import_queue_messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Messages waiting in a queue, leased or not.
    pub async fn depth(pool: &PgPool, queue: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM import_queue_messages WHERE queue = $1")
            .bind(queue)
            .fetch_one(pool)
            .await
    }
}
