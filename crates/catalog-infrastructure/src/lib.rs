//! # Infrastructure Layer
//!
//! Cross-cutting concerns of the catalog service: configuration, logging,
//! provider resolution and application wiring.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered TOML/environment configuration with validation |
//! | [`logging`] | Structured logging with tracing |
//! | [`di`] | Provider resolution and the application composition root |
//! | [`error_ext`] | Context helpers for foreign errors |
//! | [`constants`] | Infrastructure defaults |

// Providers register themselves through linkme; linking the crate is enough.
extern crate catalog_providers;

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use di::{CatalogApp, init_app, init_app_with_handler};
pub use error_ext::ErrorContext;
