//! Catalog Service Domain Port
//!
//! Business contract of the catalog: cached reads and announced writes.

use async_trait::async_trait;
use catalog_domain::error::Result;
use catalog_domain::value_objects::{MutationReceipt, ProductListing};

/// Catalog service interface
///
/// Every mutation follows the same order: store commit, then cache
/// invalidation, then change publication. Validation and not-found errors are
/// returned before any side effect.
#[async_trait]
pub trait CatalogServiceInterface: Send + Sync {
    /// List all products, from the cache when a live snapshot exists
    async fn list_products(&self) -> Result<ProductListing>;

    /// Create a product and announce an `add` event
    async fn create_product(&self, name: &str, price: f64) -> Result<MutationReceipt>;

    /// Update a product and announce an `update` event
    async fn update_product(&self, id: i64, name: &str, price: f64) -> Result<MutationReceipt>;

    /// Delete a product and announce a `delete` event
    async fn delete_product(&self, id: i64) -> Result<MutationReceipt>;

    /// Drop the product snapshot from the cache
    ///
    /// Returns whether a snapshot was present. Cache failures are returned
    /// to the caller.
    async fn clear_cache(&self) -> Result<bool>;

    /// Publish an arbitrary JSON payload on the product queue
    async fn enqueue_raw(&self, payload: &serde_json::Value) -> Result<()>;

    /// Bodies of the messages the change consumer processed, oldest first
    fn processed_messages(&self) -> Vec<String>;
}
