//! Record Store Port
//!
//! The authoritative product store. Each operation is a single committed
//! statement: when it returns `Ok`, the change is durable and visible to
//! subsequent reads.

use crate::entities::{Product, ProductDraft};
use crate::error::Result;
use async_trait::async_trait;

/// Persistent product store
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a product and return the committed row with its new id
    async fn insert(&self, draft: &ProductDraft) -> Result<Product>;

    /// Read every product, ordered by id
    async fn list(&self) -> Result<Vec<Product>>;

    /// Update a product, `None` when no row matches `id`
    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>>;

    /// Delete a product, returning the removed row or `None` when absent
    async fn delete(&self, id: i64) -> Result<Option<Product>>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}
