//! Change consumer configuration types

use catalog_domain::constants::{CONSUMER_PREFETCH, PROCESSED_LOG_CAPACITY};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Change consumer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConsumerConfig {
    /// Connect the consumer channel at startup
    pub enabled: bool,

    /// Unacknowledged deliveries allowed in flight
    #[validate(range(min = 1, message = "consumer prefetch cannot be 0"))]
    pub prefetch: u16,

    /// Entries kept in the processed message log
    #[validate(range(min = 1, message = "processed log capacity cannot be 0"))]
    pub log_capacity: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefetch: CONSUMER_PREFETCH,
            log_capacity: PROCESSED_LOG_CAPACITY,
        }
    }
}
