//! Event Publisher Domain Port
//!
//! Defines the business contract for announcing product changes. The catalog
//! service publishes through this trait without knowing which broker sits
//! behind it.

use crate::error::Result;
use crate::events::ChangeEvent;
use async_trait::async_trait;

/// Domain port for announcing product changes
///
/// # Example
///
/// ```no_run
/// use catalog_domain::events::{ChangeEvent, EventPublisher};
///
/// async fn announce_delete(
///     publisher: &dyn EventPublisher,
///     product_id: i64,
/// ) -> catalog_domain::Result<()> {
///     publisher.publish(&ChangeEvent::Delete { product_id }).await
/// }
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a change event
    ///
    /// Returns once the broker accepted the message. Delivery to consumers is
    /// not awaited.
    async fn publish(&self, event: &ChangeEvent) -> Result<()>;

    /// Publish an arbitrary, already serialized payload on the same queue
    async fn publish_raw(&self, payload: &[u8]) -> Result<()>;
}
