//! Domain Port Interfaces
//!
//! Contracts the catalog core needs from its external collaborators. The
//! implementations live in `catalog-providers` and are selected at runtime
//! through the registries in `catalog-application`.
//!
//! | Port | Collaborator |
//! |------|--------------|
//! | [`ProductStore`] | Persistent record store |
//! | [`CacheProvider`] | Expiring key-value cache |
//! | [`QueueConnector`] / [`QueueChannel`] | Durable message queue |

/// Provider port traits
pub mod providers;

pub use providers::{
    CacheEntryConfig, CacheProvider, DeliveryStream, ProductStore, QueueChannel, QueueConnector,
};
