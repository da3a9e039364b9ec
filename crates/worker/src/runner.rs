//! Polling loop driving one import consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::consumer::{ImportConsumer, ItemOutcome};
use crate::queue::{Delivery, ImportQueue, QueueError, MAX_RECEIVE_BATCH};

/// Counts for one receive batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub received: usize,
    pub acknowledged: usize,
    pub retried: usize,
}

/// Receive one batch and process every message in it.
///
/// Messages are acknowledged once their item is recorded, when the item no
/// longer exists, or when the body cannot be parsed. Processing errors leave
/// the message leased so it is redelivered after the visibility timeout.
pub async fn run_once(
    queue: &dyn ImportQueue,
    consumer: &ImportConsumer,
) -> Result<BatchSummary, QueueError> {
    let deliveries = queue.receive(consumer.queue(), MAX_RECEIVE_BATCH).await?;
    let mut summary = BatchSummary {
        received: deliveries.len(),
        ..Default::default()
    };

    for delivery in deliveries {
        if handle(consumer, &delivery).await {
            queue.ack(delivery.id).await?;
            summary.acknowledged += 1;
        } else {
            summary.retried += 1;
        }
    }

    Ok(summary)
}

/// Returns whether the delivery is done with.
async fn handle(consumer: &ImportConsumer, delivery: &Delivery) -> bool {
    let message = match delivery.message() {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(delivery_id = %delivery.id, error = %e, "Dropping malformed import message");
            return true;
        }
    };

    match consumer.process(&message).await {
        Ok(ItemOutcome::Missing) => true,
        Ok(outcome) => {
            tracing::debug!(item_id = %message.id, ?outcome, "Import message processed");
            true
        }
        Err(e) => {
            tracing::error!(
                item_id = %message.id,
                receive_count = delivery.receive_count,
                error = %e,
                "Import message failed, leaving it for redelivery",
            );
            false
        }
    }
}

/// Poll the consumer's queue every `poll_interval` until `cancel` fires.
pub async fn run(
    queue: Arc<dyn ImportQueue>,
    consumer: ImportConsumer,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    tracing::info!(
        queue = consumer.queue(),
        poll_interval_ms = poll_interval.as_millis() as u64,
        "Import consumer started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(queue = consumer.queue(), "Import consumer shutting down");
                break;
            }
            _ = ticker.tick() => {
                match run_once(queue.as_ref(), &consumer).await {
                    Ok(summary) if summary.received > 0 => {
                        tracing::info!(
                            queue = consumer.queue(),
                            received = summary.received,
                            acknowledged = summary.acknowledged,
                            retried = summary.retried,
                            "Import batch processed",
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(queue = consumer.queue(), error = %e, "Import poll failed");
                    }
                }
            }
        }
    }
}
