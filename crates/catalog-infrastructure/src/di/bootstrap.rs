//! Application Bootstrap
//!
//! Composition root of the catalog: resolves providers from configuration,
//! wires the catalog service to the change publisher and builds the change
//! consumer on a channel of its own.
//!
//! ```text
//! AppConfig → resolve_providers → store, cache, queue connector
//!                                            │
//!                          ┌─────────────────┴─────────────────┐
//!                  QueueClient("publisher")          QueueClient("consumer")
//!                          │                                   │
//!                   ChangePublisher ──▶ CatalogService   ChangeConsumer ──▶ ProcessedMessageLog
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let app = init_app(ConfigLoader::new().load()?).await?;
//! let consumer_task = app.start_consumer();
//! let listing = app.service().list_products().await?;
//! app.shutdown().await;
//! ```

use crate::config::AppConfig;
use crate::di::resolver::{ResolvedProviders, resolve_providers};
use catalog_application::domain_services::CatalogServiceInterface;
use catalog_application::queue::{
    ChangeConsumer, ChangePublisher, LoggingHandler, MessageHandler, ProcessedMessageLog,
    QueueClient,
};
use catalog_application::use_cases::CatalogServiceImpl;
use catalog_domain::error::Result;
use catalog_domain::events::EventPublisher;
use catalog_domain::value_objects::QueueState;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Running catalog application
pub struct CatalogApp {
    /// Application configuration
    pub config: Arc<AppConfig>,

    providers: ResolvedProviders,
    service: Arc<dyn CatalogServiceInterface>,
    publisher: Arc<ChangePublisher>,
    consumer: Option<Arc<ChangeConsumer>>,
    message_log: Arc<ProcessedMessageLog>,
}

impl CatalogApp {
    /// Catalog service
    pub fn service(&self) -> Arc<dyn CatalogServiceInterface> {
        Arc::clone(&self.service)
    }

    /// Change publisher
    pub fn publisher(&self) -> Arc<ChangePublisher> {
        Arc::clone(&self.publisher)
    }

    /// Change consumer, `None` when disabled in configuration
    pub fn consumer(&self) -> Option<Arc<ChangeConsumer>> {
        self.consumer.clone()
    }

    /// Providers the application was built from
    pub fn providers(&self) -> &ResolvedProviders {
        &self.providers
    }

    /// Processed message log shared with the consumer
    pub fn message_log(&self) -> Arc<ProcessedMessageLog> {
        Arc::clone(&self.message_log)
    }

    /// Bodies of processed messages, oldest first
    pub fn processed_messages(&self) -> Vec<String> {
        self.service.processed_messages()
    }

    /// Publisher and consumer channel states
    pub fn queue_states(&self) -> (QueueState, Option<QueueState>) {
        (
            self.publisher.state(),
            self.consumer.as_ref().map(|c| c.state()),
        )
    }

    /// Spawn the consume loop
    ///
    /// The task ends when the delivery stream closes or the connection is
    /// lost; its result carries the reason. Returns `None` when the consumer
    /// is disabled.
    pub fn start_consumer(&self) -> Option<JoinHandle<Result<()>>> {
        let consumer = Arc::clone(self.consumer.as_ref()?);
        info!(queue = consumer.queue(), "Starting change consumer");
        Some(tokio::spawn(async move { consumer.run().await }))
    }

    /// Close both queue channels
    ///
    /// Unacknowledged deliveries go back to the queue.
    pub async fn shutdown(&self) {
        if let Some(consumer) = &self.consumer {
            consumer.disconnect().await;
        }
        self.publisher.disconnect().await;
        info!("Catalog application stopped");
    }
}

impl std::fmt::Debug for CatalogApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApp")
            .field("providers", &self.providers)
            .field("publisher", &self.publisher)
            .field("consumer", &self.consumer)
            .finish_non_exhaustive()
    }
}

/// Initialize the application with the logging message handler
pub async fn init_app(config: AppConfig) -> Result<CatalogApp> {
    init_app_with_handler(config, Arc::new(LoggingHandler)).await
}

/// Initialize the application with a custom consumer handler
///
/// Both queue channels are connected before returning. A connection failure
/// is returned as is and not retried.
pub async fn init_app_with_handler(
    config: AppConfig,
    handler: Arc<dyn MessageHandler>,
) -> Result<CatalogApp> {
    info!("Initializing catalog application");

    let config = Arc::new(config);
    let providers = resolve_providers(&config)?;

    info!(
        store = providers.store.provider_name(),
        cache = providers.cache.provider_name(),
        queue = providers.queue.provider_name(),
        "Resolved providers"
    );

    let publisher = Arc::new(ChangePublisher::new(
        Arc::new(QueueClient::new("publisher", Arc::clone(&providers.queue))),
        config.queue.name.clone(),
    ));
    let message_log = Arc::new(ProcessedMessageLog::new(config.consumer.log_capacity));

    let service = CatalogServiceImpl::new(
        Arc::clone(&providers.store),
        Arc::clone(&providers.cache),
        Arc::clone(&publisher) as Arc<dyn EventPublisher>,
        Arc::clone(&message_log),
    )
    .with_cache_key(config.cache.key.clone())
    .with_cache_ttl(Duration::from_secs(config.cache.ttl_secs));

    publisher.connect().await?;

    let consumer = if config.consumer.enabled {
        let consumer = Arc::new(ChangeConsumer::new(
            Arc::new(QueueClient::new("consumer", Arc::clone(&providers.queue))),
            config.queue.name.clone(),
            config.consumer.prefetch,
            handler,
            Arc::clone(&message_log),
        ));
        consumer.connect().await?;
        Some(consumer)
    } else {
        None
    };

    info!("Catalog application initialized");

    Ok(CatalogApp {
        config,
        providers,
        service: Arc::new(service),
        publisher,
        consumer,
        message_log,
    })
}
