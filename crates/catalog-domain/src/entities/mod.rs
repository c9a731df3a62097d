//! Domain entities

/// Product entity and validated mutation input
pub mod product;

pub use product::{Product, ProductDraft};
