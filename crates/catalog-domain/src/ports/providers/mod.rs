//! Provider ports

/// Cache provider port
pub mod cache;
/// Queue transport ports
pub mod queue;
/// Record store port
pub mod store;

pub use cache::{CacheEntryConfig, CacheProvider};
pub use queue::{DeliveryStream, QueueChannel, QueueConnector};
pub use store::ProductStore;
