//! Change Consumer
//!
//! Drains the product queue one message at a time. A message is acknowledged
//! only after its handler returned `Ok`; a failing handler leads to a negative
//! acknowledgment with requeue, so the broker redelivers the identical body
//! with `redelivered` set.

use crate::queue::{ProcessedMessageLog, QueueClient};
use async_trait::async_trait;
use catalog_domain::error::Result;
use catalog_domain::events::ChangeEvent;
use catalog_domain::value_objects::{Delivery, QueueState};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Local processing step run for every delivery
///
/// Returning `Err` makes the consumer requeue the message.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Process one delivery
    async fn handle(&self, delivery: &Delivery) -> Result<()>;
}

/// Default handler: logs each change and accepts every message
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, delivery: &Delivery) -> Result<()> {
        match ChangeEvent::from_payload(&delivery.body) {
            Ok(event) => info!(
                queue = %delivery.queue,
                action = event.action(),
                product_id = event.product_id(),
                redelivered = delivery.redelivered,
                "Received product change"
            ),
            // Raw enqueues are not change events.
            Err(_) => info!(
                queue = %delivery.queue,
                body = %delivery.body_text(),
                redelivered = delivery.redelivered,
                "Received queue message"
            ),
        }
        Ok(())
    }
}

/// What happened to a delivery after its handler ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Handler succeeded and the message was acknowledged
    Acked,
    /// Handler failed and the message was handed back to the broker
    Requeued,
}

/// Consumer of the product queue
pub struct ChangeConsumer {
    client: Arc<QueueClient>,
    queue: String,
    prefetch: u16,
    handler: Arc<dyn MessageHandler>,
    log: Arc<ProcessedMessageLog>,
}

impl ChangeConsumer {
    /// Create a consumer on its own (possibly unconnected) client
    pub fn new(
        client: Arc<QueueClient>,
        queue: impl Into<String>,
        prefetch: u16,
        handler: Arc<dyn MessageHandler>,
        log: Arc<ProcessedMessageLog>,
    ) -> Self {
        Self {
            client,
            queue: queue.into(),
            prefetch: prefetch.max(1),
            handler,
            log,
        }
    }

    /// Open the consuming channel
    pub async fn connect(&self) -> Result<()> {
        self.client.connect().await
    }

    /// Drop the channel and open a new one
    pub async fn reconnect(&self) -> Result<()> {
        self.client.reconnect().await
    }

    /// Close the consuming channel; unacknowledged messages go back to the queue
    pub async fn disconnect(&self) {
        self.client.disconnect().await;
    }

    /// Lifecycle state of the consuming channel
    pub fn state(&self) -> QueueState {
        self.client.state()
    }

    /// Processed message log owned by this consumer
    pub fn log(&self) -> Arc<ProcessedMessageLog> {
        Arc::clone(&self.log)
    }

    /// Queue this consumer drains
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Consume until the delivery stream ends or the connection is lost
    ///
    /// Returns `QueueNotReady` when called before [`connect`](Self::connect).
    /// A lost connection moves the client to `Disconnected` and is returned;
    /// a reconnect followed by another `run` resumes consumption.
    pub async fn run(&self) -> Result<()> {
        let mut deliveries = self.client.consume(&self.queue, self.prefetch).await?;

        while let Some(next) = deliveries.next().await {
            let delivery = match next {
                Ok(delivery) => delivery,
                Err(e) => {
                    self.client.mark_disconnected().await;
                    error!(queue = %self.queue, error = %e, "Consumer lost its delivery stream");
                    return Err(e);
                }
            };
            self.process(&delivery).await?;
        }

        info!(queue = %self.queue, "Delivery stream ended");
        Ok(())
    }

    /// Run the handler for one delivery and settle it with the broker
    ///
    /// Errors are only returned when the ack/nack itself fails.
    pub async fn process(&self, delivery: &Delivery) -> Result<DeliveryOutcome> {
        debug!(
            queue = %delivery.queue,
            delivery_tag = delivery.delivery_tag,
            redelivered = delivery.redelivered,
            "Processing delivery"
        );

        match self.handler.handle(delivery).await {
            Ok(()) => {
                self.client.ack(delivery.delivery_tag).await?;
                self.log.record(delivery);
                debug!(delivery_tag = delivery.delivery_tag, "Delivery acknowledged");
                Ok(DeliveryOutcome::Acked)
            }
            Err(e) => {
                warn!(
                    queue = %delivery.queue,
                    delivery_tag = delivery.delivery_tag,
                    error = %e,
                    "Handler failed, requeueing message"
                );
                self.client.nack(delivery.delivery_tag, true).await?;
                Ok(DeliveryOutcome::Requeued)
            }
        }
    }
}

impl std::fmt::Debug for ChangeConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeConsumer")
            .field("queue", &self.queue)
            .field("prefetch", &self.prefetch)
            .field("client", &self.client)
            .field("processed", &self.log.len())
            .finish()
    }
}
