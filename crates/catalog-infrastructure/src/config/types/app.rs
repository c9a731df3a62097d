//! Application configuration root

use super::{CacheConfig, ConsumerConfig, LoggingConfig, QueueConfig, StoreConfig};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Complete catalog configuration
///
/// ```toml
/// [store]
/// provider = "postgres"
/// url = "postgres://catalog:secret@db:5432/catalog"
///
/// [cache]
/// provider = "redis"
/// url = "redis://redis:6379"
///
/// [queue]
/// provider = "amqp"
/// url = "amqp://rabbitmq:5672"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Logging output
    #[validate(nested)]
    pub logging: LoggingConfig,

    /// Persistent record store
    #[validate(nested)]
    pub store: StoreConfig,

    /// Product snapshot cache
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Change queue transport
    #[validate(nested)]
    pub queue: QueueConfig,

    /// Change consumer
    #[validate(nested)]
    pub consumer: ConsumerConfig,
}
