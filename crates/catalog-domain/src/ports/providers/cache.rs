//! Cache Provider Port
//!
//! Port for cache backend providers. Supports in-memory (Moka), distributed
//! (Redis) and null providers.
//!
//! ## Failure semantics
//!
//! Implementations return [`Error::Cache`](crate::error::Error::Cache) when
//! the backend is unreachable. Callers on the read path treat that as a miss;
//! callers on the write path must report it.

use crate::constants::PRODUCTS_CACHE_TTL_SECS;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache Entry Configuration
///
/// # Example
///
/// ```
/// use catalog_domain::ports::CacheEntryConfig;
/// use std::time::Duration;
///
/// let config = CacheEntryConfig::default().with_ttl_secs(5);
/// assert_eq!(config.effective_ttl(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live for the cache entry
    pub ttl: Option<Duration>,
}

impl CacheEntryConfig {
    /// Create a new cache entry config with the product snapshot TTL
    pub fn new() -> Self {
        Self {
            ttl: Some(Duration::from_secs(PRODUCTS_CACHE_TTL_SECS)),
        }
    }

    /// Set the TTL for the cache entry
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set TTL in seconds
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = Some(Duration::from_secs(secs));
        self
    }

    /// Get the effective TTL, falling back to default
    pub fn effective_ttl(&self) -> Duration {
        self.ttl
            .unwrap_or(Duration::from_secs(PRODUCTS_CACHE_TTL_SECS))
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache provider interface
///
/// Values are opaque JSON strings. Every write replaces the previous value
/// atomically; readers never observe a partial write.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Get a value, `None` on miss or expiry
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, overwriting unconditionally, expiring after the TTL
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Remove a key
    ///
    /// Idempotent: removing an absent key succeeds and returns `false`.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Check whether a live entry exists for the key
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}
