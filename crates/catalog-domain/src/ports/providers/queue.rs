//! Queue Transport Ports
//!
//! Contract for a durable, at-least-once message queue with manual
//! acknowledgment (AMQP semantics).
//!
//! ## Architecture
//!
//! A [`QueueConnector`] performs the connection handshake and opens a
//! [`QueueChannel`]. Channel state tracking (the `disconnected` /
//! `connecting` / `connected-idle` / `publishing` / `consuming` machine)
//! is the caller's job; see `catalog_application::queue::QueueClient`.
//!
//! ## Delivery guarantees
//!
//! - Messages published to a durable queue survive broker restarts.
//! - A delivery stays pending until [`QueueChannel::ack`] is called for its
//!   tag.
//! - [`QueueChannel::nack`] with `requeue = true`, closing the channel, or
//!   losing the connection makes every pending delivery of that channel
//!   available again with `redelivered = true`.

use crate::error::Result;
use crate::value_objects::Delivery;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed async stream of deliveries
///
/// Yields `Err` when the underlying connection is lost; the stream ends
/// afterwards.
pub type DeliveryStream = Pin<Box<dyn Stream<Item = Result<Delivery>> + Send + 'static>>;

/// Opens channels to a message broker
#[async_trait]
pub trait QueueConnector: Send + Sync {
    /// Connect (with credentials) and create a channel
    ///
    /// Connection failures are returned as `QueueTransport` errors and are
    /// not retried.
    async fn connect(&self) -> Result<Arc<dyn QueueChannel>>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}

/// An open channel on a broker connection
#[async_trait]
pub trait QueueChannel: Send + Sync {
    /// Declare a queue; declaring an existing queue is a no-op
    async fn declare_queue(&self, queue: &str, durable: bool) -> Result<()>;

    /// Publish a message, returning once the broker accepted it
    async fn send(&self, queue: &str, payload: &[u8]) -> Result<()>;

    /// Start consuming with at most `prefetch` unacknowledged deliveries
    async fn consume(&self, queue: &str, prefetch: u16) -> Result<DeliveryStream>;

    /// Acknowledge a delivery, removing it from the queue
    async fn ack(&self, delivery_tag: u64) -> Result<()>;

    /// Reject a delivery; `requeue` makes it available for redelivery
    async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()>;

    /// Close the channel; pending deliveries are requeued
    async fn close(&self) -> Result<()>;

    /// Whether the channel and its connection are still open
    fn is_open(&self) -> bool;
}
