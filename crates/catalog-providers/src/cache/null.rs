//! Null cache provider
//!
//! Never stores anything: every read misses, every write and delete
//! succeeds. Runs the catalog without a cache.

use async_trait::async_trait;
use catalog_domain::error::Result;
use catalog_domain::ports::{CacheEntryConfig, CacheProvider};
use std::sync::Arc;

/// Null cache provider that doesn't store anything
///
/// # Example
///
/// ```
/// use catalog_providers::cache::NullCacheProvider;
///
/// let provider = NullCacheProvider::new();
/// // All operations succeed but nothing is cached
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCacheProvider;

impl NullCacheProvider {
    /// Create a new null cache provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

use catalog_application::ports::registry::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry,
};

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static NULL_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "null",
    description: "No-op cache, every read misses",
    factory: |_: &CacheProviderConfig| Ok(Arc::new(NullCacheProvider::new())),
};
