//! AMQP 0-9-1 transport (RabbitMQ)
//!
//! One connection per connector, one channel per [`QueueConnector::connect`]
//! call. Messages are published persistent to the default exchange with the
//! queue name as routing key, and every publish waits for the broker's
//! confirm.

use crate::constants::{AMQP_PERSISTENT_DELIVERY_MODE, AMQP_REPLY_SUCCESS};
use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{DeliveryStream, QueueChannel, QueueConnector};
use catalog_domain::value_objects::Delivery;
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicPublishOptions, BasicQosOptions,
    ConfirmSelectOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::uri::AMQPUri;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

fn transport_error(message: &str, error: lapin::Error) -> Error {
    Error::queue_transport_with_source(message.to_string(), error)
}

/// Connector for a RabbitMQ broker
pub struct AmqpConnector {
    uri: AMQPUri,
    connection: Mutex<Option<Arc<Connection>>>,
}

impl AmqpConnector {
    /// Create a connector for `url`, optionally overriding its credentials
    ///
    /// Nothing is contacted until [`QueueConnector::connect`].
    pub fn new(url: &str, username: Option<&str>, password: Option<&str>) -> Result<Self> {
        let mut uri: AMQPUri = url
            .parse()
            .map_err(|e: String| Error::configuration(format!("Invalid AMQP URL: {e}")))?;
        if let Some(username) = username {
            uri.authority.userinfo.username = username.to_string();
        }
        if let Some(password) = password {
            uri.authority.userinfo.password = password.to_string();
        }

        Ok(Self {
            uri,
            connection: Mutex::new(None),
        })
    }

    /// Broker host and port, without credentials
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.uri.authority.host, self.uri.authority.port)
    }

    /// Reuse the open connection or establish a new one
    async fn connection(&self) -> Result<Arc<Connection>> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.as_ref().filter(|c| c.status().connected()) {
            return Ok(Arc::clone(connection));
        }

        let connection = Connection::connect_uri(self.uri.clone(), ConnectionProperties::default())
            .await
            .map_err(|e| transport_error("Failed to connect to RabbitMQ", e))?;
        info!(endpoint = %self.endpoint(), "Connected to RabbitMQ");

        let connection = Arc::new(connection);
        *slot = Some(Arc::clone(&connection));
        Ok(connection)
    }
}

#[async_trait]
impl QueueConnector for AmqpConnector {
    async fn connect(&self) -> Result<Arc<dyn QueueChannel>> {
        let connection = self.connection().await?;
        let channel = connection
            .create_channel()
            .await
            .map_err(|e| transport_error("Failed to create channel", e))?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(|e| transport_error("Failed to enable publisher confirms", e))?;
        debug!(channel_id = channel.id(), "Opened AMQP channel");

        Ok(Arc::new(AmqpChannel {
            connection,
            channel,
        }))
    }

    fn provider_name(&self) -> &str {
        "amqp"
    }
}

impl std::fmt::Debug for AmqpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpConnector")
            .field("endpoint", &self.endpoint())
            .finish_non_exhaustive()
    }
}

/// An open AMQP channel
pub struct AmqpChannel {
    connection: Arc<Connection>,
    channel: Channel,
}

#[async_trait]
impl QueueChannel for AmqpChannel {
    async fn declare_queue(&self, queue: &str, durable: bool) -> Result<()> {
        self.channel
            .queue_declare(
                queue,
                QueueDeclareOptions {
                    durable,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| transport_error("Failed to declare queue", e))?;
        Ok(())
    }

    async fn send(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let confirmation = self
            .channel
            .basic_publish(
                "",
                queue,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default().with_delivery_mode(AMQP_PERSISTENT_DELIVERY_MODE),
            )
            .await
            .map_err(|e| transport_error("Failed to publish message", e))?
            .await
            .map_err(|e| transport_error("Publish was not confirmed", e))?;

        if confirmation.is_nack() {
            return Err(Error::queue_transport(format!(
                "broker rejected message for queue '{queue}'"
            )));
        }
        Ok(())
    }

    async fn consume(&self, queue: &str, prefetch: u16) -> Result<DeliveryStream> {
        self.channel
            .basic_qos(prefetch, BasicQosOptions::default())
            .await
            .map_err(|e| transport_error("Failed to set prefetch", e))?;

        let consumer_tag = format!("catalog-consumer-{}", self.channel.id());
        let consumer = self
            .channel
            .basic_consume(
                queue,
                &consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| transport_error("Failed to start consumer", e))?;

        let queue = queue.to_string();
        let deliveries = consumer.map(move |item| {
            item.map(|delivery| Delivery {
                queue: queue.clone(),
                delivery_tag: delivery.delivery_tag,
                body: delivery.data,
                redelivered: delivery.redelivered,
            })
            .map_err(|e| transport_error("Consumer connection lost", e))
        });
        Ok(Box::pin(deliveries))
    }

    async fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.channel
            .basic_ack(delivery_tag, BasicAckOptions::default())
            .await
            .map_err(|e| transport_error("Failed to ack delivery", e))
    }

    async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        self.channel
            .basic_nack(
                delivery_tag,
                BasicNackOptions {
                    requeue,
                    multiple: false,
                },
            )
            .await
            .map_err(|e| transport_error("Failed to nack delivery", e))
    }

    async fn close(&self) -> Result<()> {
        if !self.channel.status().connected() {
            return Ok(());
        }
        self.channel
            .close(AMQP_REPLY_SUCCESS, "catalog channel closed")
            .await
            .map_err(|e| transport_error("Failed to close channel", e))
    }

    fn is_open(&self) -> bool {
        self.connection.status().connected() && self.channel.status().connected()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use crate::constants::AMQP_DEFAULT_URL;
use catalog_application::ports::registry::{
    QUEUE_PROVIDERS, QueueProviderConfig, QueueProviderEntry,
};

fn amqp_queue_factory(
    config: &QueueProviderConfig,
) -> std::result::Result<Arc<dyn QueueConnector>, String> {
    let connector = AmqpConnector::new(
        config.uri.as_deref().unwrap_or(AMQP_DEFAULT_URL),
        config.username.as_deref(),
        config.password.as_deref(),
    )
    .map_err(|e| format!("Failed to create AMQP connector: {e}"))?;
    Ok(Arc::new(connector))
}

#[linkme::distributed_slice(QUEUE_PROVIDERS)]
static AMQP_PROVIDER: QueueProviderEntry = QueueProviderEntry {
    name: "amqp",
    description: "RabbitMQ over AMQP 0-9-1 (lapin)",
    factory: amqp_queue_factory,
};
