//! Cache Provider Registry
//!
//! Auto-registration system for cache providers. Providers register
//! themselves via `#[linkme::distributed_slice(CACHE_PROVIDERS)]` and are
//! discovered at runtime by name.

use std::sync::Arc;

use crate::ports::CacheProvider;

/// Configuration for cache provider creation
///
/// Contains all configuration options that a cache provider might need.
/// Providers should use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct CacheProviderConfig {
    /// Provider name (e.g., "moka", "redis", "null")
    pub provider: String,
    /// Connection URI (for distributed caches)
    pub uri: Option<String>,
    /// Maximum number of entries (for in-process caches)
    pub max_entries: Option<u64>,
}

impl CacheProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = Some(max_entries);
        self
    }
}

/// Registry entry for cache providers
pub struct CacheProviderEntry {
    /// Unique provider name (e.g., "moka", "redis", "null")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instance
    pub factory: fn(&CacheProviderConfig) -> Result<Arc<dyn CacheProvider>, String>,
}

#[linkme::distributed_slice]
pub static CACHE_PROVIDERS: [CacheProviderEntry] = [..];

/// Resolve cache provider by name from registry
///
/// # Returns
/// * `Ok(Arc<dyn CacheProvider>)` - Created provider instance
/// * `Err(String)` - Error message if provider not found or creation failed
pub fn resolve_cache_provider(
    config: &CacheProviderConfig,
) -> Result<Arc<dyn CacheProvider>, String> {
    CACHE_PROVIDERS
        .iter()
        .find(|entry| entry.name == config.provider)
        .map(|entry| (entry.factory)(config))
        .unwrap_or_else(|| {
            let available: Vec<&str> = CACHE_PROVIDERS.iter().map(|e| e.name).collect();
            Err(format!(
                "Unknown cache provider '{}'. Available providers: {:?}",
                config.provider, available
            ))
        })
}

/// List all registered cache providers as (name, description) tuples
pub fn list_cache_providers() -> Vec<(&'static str, &'static str)> {
    CACHE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
