//! # Product Catalog - Provider Implementations
//!
//! User-selectable adapters for the ports defined in `catalog-domain`. Every
//! provider registers itself in the linkme registries of
//! `catalog-application`, so linking this crate is enough to make it
//! resolvable by name.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Record Store | `ProductStore` | Postgres, InMemory |
//! | Message Queue | `QueueConnector` | Amqp, InMemoryBroker |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! catalog-providers = { version = "0.1", default-features = false, features = ["cache-moka"] }
//! ```
//!
//! The null cache, in-memory store and in-memory broker are always built.

pub use catalog_domain::error::{Error, Result};
pub use catalog_domain::ports::{CacheProvider, ProductStore, QueueChannel, QueueConnector};

/// Provider-specific constants
pub mod constants;

/// Cache provider implementations
pub mod cache;

/// Record store implementations
pub mod store;

/// Message queue transports
pub mod queue;
