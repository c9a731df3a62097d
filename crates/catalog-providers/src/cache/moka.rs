//! Moka in-memory cache provider
//!
//! Each entry expires after the TTL it was written with, measured from the
//! write. Overwriting an entry restarts its TTL.
//!
//! ## Example
//!
//! ```
//! use catalog_providers::cache::MokaCacheProvider;
//!
//! let provider = MokaCacheProvider::with_capacity(100);
//! assert_eq!(provider.max_entries(), 100);
//! ```

use crate::constants::CACHE_DEFAULT_MAX_ENTRIES;
use async_trait::async_trait;
use catalog_domain::error::Result;
use catalog_domain::ports::{CacheEntryConfig, CacheProvider};
use moka::Expiry;
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CachedValue {
    json: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL stored alongside it
struct WriteTtl;

impl Expiry<String, CachedValue> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, CachedValue>,
    max_entries: u64,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a provider with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_ENTRIES)
    }

    /// Create a provider holding at most `max_entries` entries
    pub fn with_capacity(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(WriteTtl)
            .build();

        Self { cache, max_entries }
    }

    /// Maximum number of entries
    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        Ok(self.cache.get(key).await.map(|v| v.json.to_string()))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let entry = CachedValue {
            json: Arc::from(value),
            ttl: config.effective_ttl(),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_entries", &self.max_entries)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

use catalog_application::ports::registry::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry,
};

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "moka",
    description: "Moka in-process cache with per-entry TTL",
    factory: |config: &CacheProviderConfig| {
        let provider = config
            .max_entries
            .map_or_else(MokaCacheProvider::new, MokaCacheProvider::with_capacity);
        Ok(Arc::new(provider))
    },
};
