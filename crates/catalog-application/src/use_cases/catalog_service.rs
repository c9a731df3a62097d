//! Catalog Service Use Case
//!
//! Read path: cached snapshot or a full store read that repopulates the cache.
//! Write path: store commit, cache invalidation, change publication, in that
//! order.

use crate::domain_services::CatalogServiceInterface;
use crate::queue::ProcessedMessageLog;
use async_trait::async_trait;
use catalog_domain::constants::{PRODUCTS_CACHE_KEY, PRODUCTS_CACHE_TTL_SECS};
use catalog_domain::entities::{Product, ProductDraft};
use catalog_domain::error::{Error, Result};
use catalog_domain::events::{ChangeEvent, EventPublisher};
use catalog_domain::ports::{CacheEntryConfig, CacheProvider, ProductStore};
use catalog_domain::value_objects::{InvalidationOutcome, MutationReceipt, ProductListing};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Catalog service implementation
pub struct CatalogServiceImpl {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn CacheProvider>,
    publisher: Arc<dyn EventPublisher>,
    message_log: Arc<ProcessedMessageLog>,
    cache_key: String,
    cache_ttl: Duration,
    /// Bumped before every invalidation; a store read only repopulates the
    /// cache if no invalidation happened since the read started
    generation: AtomicU64,
}

impl CatalogServiceImpl {
    /// Create a catalog service with the default snapshot key and TTL
    pub fn new(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn CacheProvider>,
        publisher: Arc<dyn EventPublisher>,
        message_log: Arc<ProcessedMessageLog>,
    ) -> Self {
        Self {
            store,
            cache,
            publisher,
            message_log,
            cache_key: PRODUCTS_CACHE_KEY.to_string(),
            cache_ttl: Duration::from_secs(PRODUCTS_CACHE_TTL_SECS),
            generation: AtomicU64::new(0),
        }
    }

    /// Override the snapshot TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Override the snapshot cache key
    pub fn with_cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    /// Cached snapshot, `None` on miss, expiry, cache failure or a corrupt value
    async fn cached_snapshot(&self) -> Option<Vec<Product>> {
        let raw = match self.cache.get_json(&self.cache_key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %self.cache_key, error = %e, "Cache read failed, reading from store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(products) => Some(products),
            Err(e) => {
                warn!(key = %self.cache_key, error = %e, "Ignoring undecodable cache snapshot");
                None
            }
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Repopulate the cache with a snapshot read at generation `read_at`
    async fn store_snapshot(&self, products: &[Product], read_at: u64) {
        if self.current_generation() != read_at {
            debug!(key = %self.cache_key, "Snapshot outdated by a concurrent write, not caching");
            return;
        }
        let value = match serde_json::to_string(products) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Could not serialize product snapshot");
                return;
            }
        };
        let config = CacheEntryConfig::default().with_ttl(self.cache_ttl);
        if let Err(e) = self.cache.set_json(&self.cache_key, &value, config).await {
            warn!(key = %self.cache_key, error = %e, "Failed to repopulate product cache");
            return;
        }
        // A write may have invalidated between the check and the set
        if self.current_generation() != read_at
            && let Err(e) = self.cache.delete(&self.cache_key).await
        {
            warn!(key = %self.cache_key, error = %e, "Failed to drop outdated snapshot");
        }
    }

    async fn invalidate(&self) -> InvalidationOutcome {
        self.bump_generation();
        match self.cache.delete(&self.cache_key).await {
            Ok(_) => {
                debug!(key = %self.cache_key, "Invalidated product snapshot");
                InvalidationOutcome::Invalidated
            }
            Err(e) => {
                error!(
                    key = %self.cache_key,
                    error = %e,
                    "Cache invalidation failed, snapshot may be stale until it expires"
                );
                InvalidationOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Invalidate and announce a committed mutation
    async fn complete_mutation(
        &self,
        product: Product,
        event: ChangeEvent,
    ) -> Result<MutationReceipt> {
        let invalidation = self.invalidate().await;

        if let Err(e) = self.publisher.publish(&event).await {
            error!(
                action = event.action(),
                product_id = event.product_id(),
                error = %e,
                "Store change committed but not announced"
            );
            return Err(e);
        }

        info!(
            action = event.action(),
            product_id = event.product_id(),
            "Product change committed and announced"
        );
        Ok(MutationReceipt {
            product,
            invalidation,
        })
    }
}

#[async_trait]
impl CatalogServiceInterface for CatalogServiceImpl {
    async fn list_products(&self) -> Result<ProductListing> {
        if let Some(products) = self.cached_snapshot().await {
            debug!(count = products.len(), "Serving products from cache");
            return Ok(ProductListing::hit(products));
        }

        let read_at = self.current_generation();
        let products = self.store.list().await?;
        self.store_snapshot(&products, read_at).await;
        debug!(count = products.len(), "Serving products from store");
        Ok(ProductListing::miss(products))
    }

    async fn create_product(&self, name: &str, price: f64) -> Result<MutationReceipt> {
        let draft = ProductDraft::new(name, price)?;
        let product = self.store.insert(&draft).await?;
        let event = ChangeEvent::Add {
            product: product.clone(),
        };
        self.complete_mutation(product, event).await
    }

    async fn update_product(&self, id: i64, name: &str, price: f64) -> Result<MutationReceipt> {
        let draft = ProductDraft::new(name, price)?;
        let product = self
            .store
            .update(id, &draft)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id}")))?;
        let event = ChangeEvent::Update {
            product: product.clone(),
        };
        self.complete_mutation(product, event).await
    }

    async fn delete_product(&self, id: i64) -> Result<MutationReceipt> {
        let product = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("product {id}")))?;
        let event = ChangeEvent::Delete { product_id: id };
        self.complete_mutation(product, event).await
    }

    async fn clear_cache(&self) -> Result<bool> {
        self.bump_generation();
        let removed = self.cache.delete(&self.cache_key).await?;
        info!(key = %self.cache_key, removed, "Product cache cleared");
        Ok(removed)
    }

    async fn enqueue_raw(&self, payload: &serde_json::Value) -> Result<()> {
        let empty = match payload {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            serde_json::Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if empty {
            return Err(Error::validation("queue payload must not be empty"));
        }
        let body = serde_json::to_vec(payload)?;
        self.publisher.publish_raw(&body).await?;
        debug!(bytes = body.len(), "Enqueued raw payload");
        Ok(())
    }

    fn processed_messages(&self) -> Vec<String> {
        self.message_log.bodies()
    }
}

impl std::fmt::Debug for CatalogServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogServiceImpl")
            .field("store", &self.store.provider_name())
            .field("cache", &self.cache.provider_name())
            .field("cache_key", &self.cache_key)
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}
