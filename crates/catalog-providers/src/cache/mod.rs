//! Cache Provider Implementations
//!
//! Backends for the product snapshot cache.
//!
//! ## Available Providers
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullCacheProvider`] | Testing | Always misses, accepts every write |
//! | [`MokaCacheProvider`] | Local | In-process cache with per-entry TTL |
//! | [`RedisCacheProvider`] | Distributed | `PSETEX`/`DEL` on a shared Redis |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: `NullCacheProvider` or `MokaCacheProvider`
//! - **Single Instance**: `MokaCacheProvider`
//! - **Multi Instance**: `RedisCacheProvider`, so every instance invalidates
//!   the same snapshot

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use self::moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheProvider;

pub use catalog_domain::ports::CacheEntryConfig;
