//! Use Cases - Application Service Implementations

/// Catalog service: read-through listing and announced mutations
pub mod catalog_service;

pub use catalog_service::CatalogServiceImpl;
