//! Import queue abstraction and its Postgres implementation.

use std::time::Duration;

use async_trait::async_trait;
use plotwist_core::imports::ImportMessage;
use plotwist_core::types::DbId;
use plotwist_db::repositories::ImportQueueRepo;
use sqlx::PgPool;

/// Most messages handed out by one receive call.
pub const MAX_RECEIVE_BATCH: i64 = 10;

/// How long a received message stays invisible to other consumers.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid message body: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A leased message. It is redelivered after the visibility timeout unless
/// acknowledged.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub id: DbId,
    pub body: serde_json::Value,
    pub receive_count: i32,
}

impl Delivery {
    pub fn message(&self) -> Result<ImportMessage, QueueError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}

/// Queue used between the import endpoint and the consumers.
#[async_trait]
pub trait ImportQueue: Send + Sync {
    /// Publish messages to a queue. Returns how many were enqueued.
    async fn publish(&self, queue: &str, messages: &[ImportMessage]) -> Result<u64, QueueError>;

    /// Lease up to `max` messages.
    async fn receive(&self, queue: &str, max: i64) -> Result<Vec<Delivery>, QueueError>;

    /// Remove a message for good.
    async fn ack(&self, delivery_id: DbId) -> Result<(), QueueError>;
}

/// [`ImportQueue`] backed by the `import_queue_messages` table.
#[derive(Clone)]
pub struct PgImportQueue {
    pool: PgPool,
    visibility: Duration,
}

impl PgImportQueue {
    pub fn new(pool: PgPool) -> Self {
        Self::with_visibility(pool, DEFAULT_VISIBILITY_TIMEOUT)
    }

    pub fn with_visibility(pool: PgPool, visibility: Duration) -> Self {
        Self { pool, visibility }
    }
}

#[async_trait]
impl ImportQueue for PgImportQueue {
    async fn publish(&self, queue: &str, messages: &[ImportMessage]) -> Result<u64, QueueError> {
        let bodies = messages
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        let published = ImportQueueRepo::enqueue_many(&self.pool, queue, &bodies).await?;
        tracing::debug!(queue, published, "Import messages published");
        Ok(published)
    }

    async fn receive(&self, queue: &str, max: i64) -> Result<Vec<Delivery>, QueueError> {
        let messages = ImportQueueRepo::receive(&self.pool, queue, max, self.visibility).await?;
        Ok(messages
            .into_iter()
            .map(|m| Delivery {
                id: m.id,
                body: m.body,
                receive_count: m.receive_count,
            })
            .collect())
    }

    async fn ack(&self, delivery_id: DbId) -> Result<(), QueueError> {
        ImportQueueRepo::delete(&self.pool, delivery_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn malformed_body_is_a_serialization_error() {
        let delivery = Delivery {
            id: uuid::Uuid::nil(),
            body: json!({"name": "Heat"}),
            receive_count: 1,
        };
        assert_matches!(delivery.message(), Err(QueueError::Serialization(_)));
    }

    #[test]
    fn well_formed_body_parses() {
        let id = uuid::Uuid::now_v7();
        let delivery = Delivery {
            id: uuid::Uuid::nil(),
            body: json!({"id": id, "name": "Heat", "provider": "LETTERBOXD", "user_id": id}),
            receive_count: 1,
        };
        let message = delivery.message().unwrap();
        assert_eq!(message.id, id);
        assert_eq!(message.name, "Heat");
    }
}
