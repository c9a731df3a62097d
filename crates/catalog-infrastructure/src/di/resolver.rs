//! Provider Resolver
//!
//! Turns configuration sections into provider instances through the linkme
//! registries. Concrete adapters are never named here.
//!
//! ```text
//! Config: "cache.provider = redis"
//!                    │
//!                    ▼
//!        resolve_providers(&config)
//!                    │
//!                    ▼
//!        CACHE_PROVIDERS.iter()   ← auto-registered by catalog-providers
//!                    │
//!                    ▼
//!        ResolvedProviders { store, cache, queue }
//! ```

use std::sync::Arc;

use catalog_application::ports::registry::{
    CacheProviderConfig, QueueProviderConfig, StoreProviderConfig, list_cache_providers,
    list_queue_providers, list_store_providers, resolve_cache_provider, resolve_queue_provider,
    resolve_store_provider,
};
use catalog_application::ports::{CacheProvider, ProductStore, QueueConnector};
use catalog_domain::error::{Error, Result};
use serde::Serialize;

use crate::config::{AppConfig, CacheConfig, QueueConfig, StoreConfig};

/// Provider instances selected by configuration
#[derive(Clone)]
pub struct ResolvedProviders {
    /// Persistent record store
    pub store: Arc<dyn ProductStore>,
    /// Product snapshot cache
    pub cache: Arc<dyn CacheProvider>,
    /// Queue transport shared by the publisher and the consumer
    pub queue: Arc<dyn QueueConnector>,
}

impl std::fmt::Debug for ResolvedProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedProviders")
            .field("store", &self.store.provider_name())
            .field("cache", &self.cache.provider_name())
            .field("queue", &self.queue.provider_name())
            .finish()
    }
}

/// Resolve every provider named in the configuration
///
/// Creating a provider does not contact its backend; connection failures
/// surface on first use (store, cache) or on connect (queue).
pub fn resolve_providers(config: &AppConfig) -> Result<ResolvedProviders> {
    let store = resolve_store_provider(&store_config_to_registry(&config.store))
        .map_err(|e| Error::configuration(format!("Failed to resolve store provider: {e}")))?;

    let cache = resolve_cache_provider(&cache_config_to_registry(&config.cache))
        .map_err(|e| Error::configuration(format!("Failed to resolve cache provider: {e}")))?;

    let queue = resolve_queue_provider(&queue_config_to_registry(&config.queue))
        .map_err(|e| Error::configuration(format!("Failed to resolve queue provider: {e}")))?;

    Ok(ResolvedProviders {
        store,
        cache,
        queue,
    })
}

fn store_config_to_registry(config: &StoreConfig) -> StoreProviderConfig {
    StoreProviderConfig {
        provider: config.provider.clone(),
        uri: config.url.clone(),
        max_connections: Some(config.max_connections),
        connection_timeout_secs: Some(config.connection_timeout_secs),
    }
}

fn cache_config_to_registry(config: &CacheConfig) -> CacheProviderConfig {
    CacheProviderConfig {
        provider: config.provider.clone(),
        uri: config.url.clone(),
        max_entries: Some(config.max_entries),
    }
}

fn queue_config_to_registry(config: &QueueConfig) -> QueueProviderConfig {
    QueueProviderConfig {
        provider: config.provider.clone(),
        uri: config.url.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
    }
}

/// A registered provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderInfo {
    /// Name used in configuration
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

/// Registered providers by category
#[derive(Debug, Clone, Serialize)]
pub struct AvailableProviders {
    /// Record store providers
    pub store: Vec<ProviderInfo>,
    /// Cache providers
    pub cache: Vec<ProviderInfo>,
    /// Queue transports
    pub queue: Vec<ProviderInfo>,
}

/// List all registered providers across categories
pub fn list_available_providers() -> AvailableProviders {
    fn infos(entries: Vec<(&'static str, &'static str)>) -> Vec<ProviderInfo> {
        entries
            .into_iter()
            .map(|(name, description)| ProviderInfo { name, description })
            .collect()
    }

    AvailableProviders {
        store: infos(list_store_providers()),
        cache: infos(list_cache_providers()),
        queue: infos(list_queue_providers()),
    }
}

impl std::fmt::Display for AvailableProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sections = [
            ("Store Providers", &self.store),
            ("Cache Providers", &self.cache),
            ("Queue Providers", &self.queue),
        ];
        for (title, providers) in sections {
            writeln!(f, "{title}:")?;
            for provider in providers {
                writeln!(f, "  - {}: {}", provider.name, provider.description)?;
            }
        }
        Ok(())
    }
}
