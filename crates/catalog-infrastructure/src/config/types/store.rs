//! Record store configuration types

use crate::constants::{
    DEFAULT_STORE_CONNECTION_TIMEOUT_SECS, DEFAULT_STORE_MAX_CONNECTIONS, DEFAULT_STORE_PROVIDER,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreConfig {
    /// Provider name (`postgres`, `memory`)
    #[validate(length(min = 1, message = "store provider cannot be empty"))]
    pub provider: String,

    /// Connection URL; also set by `DATABASE_URL`
    pub url: Option<String>,

    /// Maximum pooled connections
    #[validate(range(min = 1, message = "store pool needs at least one connection"))]
    pub max_connections: u32,

    /// Pool checkout timeout in seconds
    #[validate(range(min = 1, message = "store connection timeout cannot be 0"))]
    pub connection_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_STORE_PROVIDER.to_string(),
            url: None,
            max_connections: DEFAULT_STORE_MAX_CONNECTIONS,
            connection_timeout_secs: DEFAULT_STORE_CONNECTION_TIMEOUT_SECS,
        }
    }
}
