//! Service interfaces
//!
//! Contracts of the application services, consumed by the infrastructure
//! bootstrap and the CLI.

/// Catalog service interface
pub mod catalog;

pub use catalog::CatalogServiceInterface;
