//! Cache configuration types

use crate::constants::{DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_PROVIDER, DEFAULT_REDIS_URL};
use catalog_domain::constants::{PRODUCTS_CACHE_KEY, PRODUCTS_CACHE_TTL_SECS};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product snapshot cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CacheConfig {
    /// Provider name (`redis`, `moka`, `null`)
    #[validate(length(min = 1, message = "cache provider cannot be empty"))]
    pub provider: String,

    /// Connection URL for distributed caches; also set by `REDIS_URL`
    pub url: Option<String>,

    /// Maximum entries held by in-process caches
    #[validate(range(min = 1, message = "cache capacity cannot be 0"))]
    pub max_entries: u64,

    /// Key holding the product snapshot
    #[validate(length(min = 1, message = "cache key cannot be empty"))]
    pub key: String,

    /// Snapshot lifetime in seconds
    #[validate(range(min = 1, message = "cache TTL cannot be 0"))]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_CACHE_PROVIDER.to_string(),
            url: Some(DEFAULT_REDIS_URL.to_string()),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            key: PRODUCTS_CACHE_KEY.to_string(),
            ttl_secs: PRODUCTS_CACHE_TTL_SECS,
        }
    }
}
