//! Redis distributed cache provider
//!
//! Writes use `PSETEX`, so the snapshot TTL is enforced by the server and
//! shared by every catalog instance.
//!
//! ## Example
//!
//! ```ignore
//! use catalog_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379")?;
//! // Or with host/port
//! let provider = RedisCacheProvider::with_host_port("redis", 6379)?;
//! ```

use crate::constants::REDIS_DEFAULT_URL;
use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{CacheEntryConfig, CacheProvider};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use std::sync::Arc;
use std::time::Duration;

/// TTL in whole milliseconds, rounded up so a sub-millisecond TTL still expires
fn ttl_millis(ttl: Duration) -> u64 {
    let millis = ttl.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Redis cache provider
///
/// Uses multiplexed connections for efficient connection reuse.
#[derive(Clone)]
pub struct RedisCacheProvider {
    client: Client,
    url: String,
}

impl RedisCacheProvider {
    /// Create a provider from a connection URL (e.g. `redis://localhost:6379`)
    ///
    /// No connection is made until the first operation.
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string)
            .map_err(|e| Error::cache_with_source("Failed to create Redis client", e))?;

        Ok(Self {
            client,
            url: connection_string.to_string(),
        })
    }

    /// Create a provider from host and port
    pub fn with_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(&format!("redis://{host}:{port}"))
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::cache_with_source("Failed to get Redis connection", e))
    }

    /// Connection URL of the Redis server
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;

        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis GET failed", e))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.get_connection().await?;

        let ttl = ttl_millis(config.effective_ttl());

        let result: redis::RedisResult<()> = if ttl > 0 {
            conn.pset_ex(key, value, ttl).await
        } else {
            conn.set(key, value).await
        };

        result.map_err(|e| Error::cache_with_source("Redis PSETEX failed", e))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis DEL failed", e))?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;

        let count: i64 = conn
            .exists(key)
            .await
            .map_err(|e| Error::cache_with_source("Redis EXISTS failed", e))?;
        Ok(count > 0)
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("url", &self.url)
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use catalog_application::ports::registry::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry,
};

/// Factory function for creating Redis cache provider instances.
fn redis_cache_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    let uri = config.uri.as_deref().unwrap_or(REDIS_DEFAULT_URL);

    let provider =
        RedisCacheProvider::new(uri).map_err(|e| format!("Failed to create Redis provider: {e}"))?;

    Ok(Arc::new(provider))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "redis",
    description: "Redis distributed cache (PSETEX/DEL)",
    factory: redis_cache_factory,
};
