//! Configuration types
//!
//! One module per `catalog.toml` section.

pub mod app;
pub mod cache;
pub mod consumer;
pub mod logging;
pub mod queue;
pub mod store;

pub use app::AppConfig;
pub use cache::CacheConfig;
pub use consumer::ConsumerConfig;
pub use logging::LoggingConfig;
pub use queue::QueueConfig;
pub use store::StoreConfig;
