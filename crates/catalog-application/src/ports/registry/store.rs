//! Record Store Provider Registry
//!
//! Auto-registration system for product store providers.

use std::sync::Arc;

use crate::ports::ProductStore;

/// Configuration for store provider creation
#[derive(Debug, Clone, Default)]
pub struct StoreProviderConfig {
    /// Provider name (e.g., "postgres", "memory")
    pub provider: String,
    /// Connection URL
    pub uri: Option<String>,
    /// Maximum pooled connections
    pub max_connections: Option<u32>,
    /// Connection checkout timeout in seconds
    pub connection_timeout_secs: Option<u64>,
}

impl StoreProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the connection URL
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the pool size
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = Some(max_connections);
        self
    }

    /// Set the connection checkout timeout
    pub fn with_connection_timeout_secs(mut self, secs: u64) -> Self {
        self.connection_timeout_secs = Some(secs);
        self
    }
}

/// Registry entry for store providers
pub struct StoreProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instance
    pub factory: fn(&StoreProviderConfig) -> Result<Arc<dyn ProductStore>, String>,
}

#[linkme::distributed_slice]
pub static STORE_PROVIDERS: [StoreProviderEntry] = [..];

/// Resolve store provider by name from registry
pub fn resolve_store_provider(
    config: &StoreProviderConfig,
) -> Result<Arc<dyn ProductStore>, String> {
    STORE_PROVIDERS
        .iter()
        .find(|entry| entry.name == config.provider)
        .map(|entry| (entry.factory)(config))
        .unwrap_or_else(|| {
            let available: Vec<&str> = STORE_PROVIDERS.iter().map(|e| e.name).collect();
            Err(format!(
                "Unknown store provider '{}'. Available providers: {:?}",
                config.provider, available
            ))
        })
}

/// List all registered store providers as (name, description) tuples
pub fn list_store_providers() -> Vec<(&'static str, &'static str)> {
    STORE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
