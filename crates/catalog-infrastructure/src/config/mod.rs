//! Configuration management
//!
//! Layered loading (defaults → `catalog.toml` → environment) and the typed
//! configuration sections.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, CacheConfig, ConsumerConfig, LoggingConfig, QueueConfig, StoreConfig,
};
