//! Application ports
//!
//! Re-exports the domain provider ports and hosts the provider registries.

/// Provider registries (linkme distributed slices)
pub mod registry;

pub use catalog_domain::ports::{
    CacheEntryConfig, CacheProvider, DeliveryStream, ProductStore, QueueChannel, QueueConnector,
};
