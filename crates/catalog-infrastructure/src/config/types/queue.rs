//! Queue transport configuration types

use crate::constants::{DEFAULT_AMQP_URL, DEFAULT_QUEUE_PROVIDER};
use catalog_domain::constants::PRODUCT_QUEUE;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Change queue configuration
#[derive(Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QueueConfig {
    /// Provider name (`amqp`, `memory`)
    #[validate(length(min = 1, message = "queue provider cannot be empty"))]
    pub provider: String,

    /// Broker URL; also set by `RABBITMQ_URL`
    pub url: Option<String>,

    /// Username overriding the URL credentials; also set by `RABBITMQ_USER`
    pub username: Option<String>,

    /// Password overriding the URL credentials; also set by `RABBITMQ_PASSWORD`
    pub password: Option<String>,

    /// Queue receiving change events
    #[validate(length(min = 1, message = "queue name cannot be empty"))]
    pub name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_QUEUE_PROVIDER.to_string(),
            url: Some(DEFAULT_AMQP_URL.to_string()),
            username: None,
            password: None,
            name: PRODUCT_QUEUE.to_string(),
        }
    }
}

impl std::fmt::Debug for QueueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueConfig")
            .field("provider", &self.provider)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}
