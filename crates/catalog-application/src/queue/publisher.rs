//! Change Publisher
//!
//! Announces product changes on the product queue through its own
//! [`QueueClient`] channel.

use crate::queue::QueueClient;
use async_trait::async_trait;
use catalog_domain::error::Result;
use catalog_domain::events::{ChangeEvent, EventPublisher};
use catalog_domain::value_objects::QueueState;
use std::sync::Arc;
use tracing::{debug, info};

/// Publishes change events to a durable queue
///
/// Fire-and-forget from the caller's point of view: `publish` returns once
/// the broker accepted the message.
pub struct ChangePublisher {
    client: Arc<QueueClient>,
    queue: String,
}

impl ChangePublisher {
    /// Create a publisher for `queue` on top of a (possibly unconnected) client
    pub fn new(client: Arc<QueueClient>, queue: impl Into<String>) -> Self {
        Self {
            client,
            queue: queue.into(),
        }
    }

    /// Open the publishing channel
    pub async fn connect(&self) -> Result<()> {
        self.client.connect().await?;
        info!(queue = %self.queue, "Change publisher ready");
        Ok(())
    }

    /// Drop the channel and open a new one
    pub async fn reconnect(&self) -> Result<()> {
        self.client.reconnect().await
    }

    /// Close the publishing channel
    pub async fn disconnect(&self) {
        self.client.disconnect().await;
    }

    /// Lifecycle state of the publishing channel
    pub fn state(&self) -> QueueState {
        self.client.state()
    }

    /// Queue events are published to
    pub fn queue(&self) -> &str {
        &self.queue
    }
}

#[async_trait]
impl EventPublisher for ChangePublisher {
    async fn publish(&self, event: &ChangeEvent) -> Result<()> {
        let payload = event.to_payload()?;
        self.client.send(&self.queue, &payload).await?;
        debug!(
            queue = %self.queue,
            action = event.action(),
            product_id = event.product_id(),
            "Published change event"
        );
        Ok(())
    }

    async fn publish_raw(&self, payload: &[u8]) -> Result<()> {
        self.client.send(&self.queue, payload).await
    }
}

impl std::fmt::Debug for ChangePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePublisher")
            .field("queue", &self.queue)
            .field("client", &self.client)
            .finish()
    }
}
