//! Provider Registry System
//!
//! Defines the auto-registration infrastructure for providers. Uses the
//! `linkme` crate for compile-time registration of providers that can be
//! discovered and instantiated at runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Provider Registration Flow                    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Provider defines:  #[linkme::distributed_slice(PROVIDERS)]  │
//! │                        static ENTRY: ProviderEntry = ...        │
//! │                              ↓                                  │
//! │  2. Registry declares: #[linkme::distributed_slice]             │
//! │                        pub static PROVIDERS: [Entry] = [..]     │
//! │                              ↓                                  │
//! │  3. Resolver queries:  PROVIDERS.iter()                         │
//! │                              ↓                                  │
//! │  4. Config selects:    "provider = redis" → RedisCacheProvider  │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ### Registering a Provider (in catalog-providers)
//!
//! ```ignore
//! use catalog_application::ports::registry::{CacheProviderEntry, CACHE_PROVIDERS};
//!
//! #[linkme::distributed_slice(CACHE_PROVIDERS)]
//! static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
//!     name: "moka",
//!     description: "Moka in-memory cache",
//!     factory: |config| Ok(Arc::new(MokaCacheProvider::from_config(config))),
//! };
//! ```
//!
//! ### Resolving a Provider (in catalog-infrastructure)
//!
//! ```ignore
//! use catalog_application::ports::registry::{resolve_cache_provider, CacheProviderConfig};
//!
//! let cache = resolve_cache_provider(&CacheProviderConfig::new("moka"))?;
//! ```

pub mod cache;
pub mod queue;
pub mod store;

// Re-export all registry types and functions
pub use cache::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry, list_cache_providers,
    resolve_cache_provider,
};
pub use queue::{
    QUEUE_PROVIDERS, QueueProviderConfig, QueueProviderEntry, list_queue_providers,
    resolve_queue_provider,
};
pub use store::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry, list_store_providers,
    resolve_store_provider,
};
