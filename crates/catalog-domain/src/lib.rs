//! # Catalog Domain
//!
//! Core types and contracts for the product catalog service.
//!
//! This crate has no knowledge of Postgres, Redis or RabbitMQ. It defines:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`entities`] | [`Product`] and the validated [`ProductDraft`] mutation input |
//! | [`events`] | [`ChangeEvent`], the message announced for every store mutation |
//! | [`value_objects`] | Read results, mutation receipts, queue deliveries and channel state |
//! | [`ports`] | Provider traits implemented by `catalog-providers` |
//! | [`error`] | The domain [`Error`] taxonomy |

pub mod constants;
pub mod entities;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use entities::{Product, ProductDraft};
pub use error::{Error, Result};
pub use events::ChangeEvent;
pub use value_objects::{
    CacheStatus, Delivery, InvalidationOutcome, MutationReceipt, ProductListing, QueueState,
};
