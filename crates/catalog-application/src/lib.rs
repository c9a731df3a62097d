//! Application Layer - Product Catalog
//!
//! Orchestrates the catalog's cache-consistency and change-notification
//! pipeline on top of the ports defined in `catalog-domain`.
//!
//! ## Architecture
//!
//! - [`use_cases`]: the catalog service (read-through listing, write →
//!   invalidate → publish mutations)
//! - [`queue`]: queue channel state machine, change publisher and change
//!   consumer with its processed message log
//! - [`ports::registry`]: linkme registries through which providers make
//!   themselves discoverable
//! - [`domain_services`]: service interfaces consumed by outer layers
//!
//! ## Dependencies
//!
//! This crate depends only on `catalog-domain` and pure async/serialization
//! libraries. Concrete Postgres, Redis and AMQP adapters live in
//! `catalog-providers`.

pub mod domain_services;
pub mod ports;
pub mod queue;
pub mod use_cases;

pub use domain_services::*;
pub use queue::{
    ChangeConsumer, ChangePublisher, DeliveryOutcome, LoggingHandler, MessageHandler,
    ProcessedMessageLog, QueueClient,
};
pub use use_cases::CatalogServiceImpl;
