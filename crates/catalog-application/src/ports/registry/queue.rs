//! Queue Provider Registry
//!
//! Auto-registration system for queue transports. A resolved connector is
//! shared by the publisher and the consumer, each opening its own channel.

use std::sync::Arc;

use crate::ports::QueueConnector;

/// Configuration for queue provider creation
#[derive(Debug, Clone, Default)]
pub struct QueueProviderConfig {
    /// Provider name (e.g., "amqp", "memory")
    pub provider: String,
    /// Broker URL
    pub uri: Option<String>,
    /// Username, overriding any credentials in the URL
    pub username: Option<String>,
    /// Password, overriding any credentials in the URL
    pub password: Option<String>,
}

impl QueueProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the broker URL
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set explicit credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// Registry entry for queue providers
pub struct QueueProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the connector
    pub factory: fn(&QueueProviderConfig) -> Result<Arc<dyn QueueConnector>, String>,
}

#[linkme::distributed_slice]
pub static QUEUE_PROVIDERS: [QueueProviderEntry] = [..];

/// Resolve queue provider by name from registry
pub fn resolve_queue_provider(
    config: &QueueProviderConfig,
) -> Result<Arc<dyn QueueConnector>, String> {
    QUEUE_PROVIDERS
        .iter()
        .find(|entry| entry.name == config.provider)
        .map(|entry| (entry.factory)(config))
        .unwrap_or_else(|| {
            let available: Vec<&str> = QUEUE_PROVIDERS.iter().map(|e| e.name).collect();
            Err(format!(
                "Unknown queue provider '{}'. Available providers: {:?}",
                config.provider, available
            ))
        })
}

/// List all registered queue providers as (name, description) tuples
pub fn list_queue_providers() -> Vec<(&'static str, &'static str)> {
    QUEUE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
