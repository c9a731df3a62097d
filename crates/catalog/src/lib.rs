//! # Product Catalog
//!
//! Serves products from a relational store, caches the full listing under a
//! single expiring key and announces every mutation on a durable queue.
//!
//! ## Example
//!
//! ```ignore
//! use catalog::infrastructure::{ConfigLoader, init_app};
//!
//! let app = init_app(ConfigLoader::new().load()?).await?;
//! let receipt = app.service().create_product("Widget", 9.99).await?;
//! // {"action":"add","product":{"id":1,"name":"Widget","price":9.99}} is now queued
//! ```
//!
//! ## Architecture
//!
//! - `domain` - entities, change events, error type and ports
//! - `application` - catalog service, queue state machine, publisher and consumer
//! - `infrastructure` - configuration, logging and bootstrap
//! - [`cli`] - the `catalog` command line

// Force-link catalog-providers so the linkme registrations are included
extern crate catalog_providers;

pub mod cli;

/// Domain layer - core business types
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use catalog_domain::*;
}

/// Application layer - catalog service and queue protocol
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use catalog_application::*;
}

/// Infrastructure layer - configuration, logging and bootstrap
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use catalog_infrastructure::*;
}

pub use cli::{Cli, Command, run};
pub use domain::entities::Product;
pub use domain::error::{Error, Result};
