//! Provider resolution and application wiring

pub mod bootstrap;
pub mod resolver;

pub use bootstrap::{CatalogApp, init_app, init_app_with_handler};
pub use resolver::{
    AvailableProviders, ProviderInfo, ResolvedProviders, list_available_providers,
    resolve_providers,
};
