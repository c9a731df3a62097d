//! Tests for the queue channel state machine and the change publisher

use async_trait::async_trait;
use catalog_application::queue::{ChangePublisher, QueueClient};
use catalog_domain::constants::PRODUCT_QUEUE;
use catalog_domain::entities::Product;
use catalog_domain::error::{Error, Result};
use catalog_domain::events::{ChangeEvent, EventPublisher};
use catalog_domain::ports::{DeliveryStream, QueueChannel, QueueConnector};
use catalog_domain::value_objects::QueueState;
use catalog_providers::queue::InMemoryBroker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn client(broker: &InMemoryBroker, label: &str) -> Arc<QueueClient> {
    Arc::new(QueueClient::new(label, Arc::new(broker.clone())))
}

/// Broker whose channels reject publishes while `reject` is set
#[derive(Clone, Default)]
struct RejectingBroker {
    inner: InMemoryBroker,
    reject: Arc<AtomicBool>,
    opened: Arc<Mutex<Vec<Arc<dyn QueueChannel>>>>,
}

#[async_trait]
impl QueueConnector for RejectingBroker {
    async fn connect(&self) -> Result<Arc<dyn QueueChannel>> {
        let channel = self.inner.connect().await?;
        self.opened.lock().unwrap().push(Arc::clone(&channel));
        Ok(Arc::new(RejectingChannel {
            inner: channel,
            reject: Arc::clone(&self.reject),
        }))
    }

    fn provider_name(&self) -> &str {
        "rejecting"
    }
}

struct RejectingChannel {
    inner: Arc<dyn QueueChannel>,
    reject: Arc<AtomicBool>,
}

#[async_trait]
impl QueueChannel for RejectingChannel {
    async fn declare_queue(&self, queue: &str, durable: bool) -> Result<()> {
        self.inner.declare_queue(queue, durable).await
    }

    async fn send(&self, queue: &str, payload: &[u8]) -> Result<()> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::queue_transport("broker rejected message"));
        }
        self.inner.send(queue, payload).await
    }

    async fn consume(&self, queue: &str, prefetch: u16) -> Result<DeliveryStream> {
        self.inner.consume(queue, prefetch).await
    }

    async fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.inner.ack(delivery_tag).await
    }

    async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        self.inner.nack(delivery_tag, requeue).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }

    fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}

#[tokio::test]
async fn test_send_before_connect_is_not_ready() {
    let broker = InMemoryBroker::new();
    let client = client(&broker, "publisher");

    assert_eq!(client.state(), QueueState::Disconnected);
    let err = client.send(PRODUCT_QUEUE, b"{}").await.unwrap_err();

    assert!(matches!(err, Error::QueueNotReady { .. }));
    assert!(err.to_string().contains("channel not initialized"));
    assert!(!broker.has_queue(PRODUCT_QUEUE));
}

#[tokio::test]
async fn test_consume_before_connect_is_not_ready() {
    let broker = InMemoryBroker::new();
    let client = client(&broker, "consumer");

    assert!(matches!(
        client.consume(PRODUCT_QUEUE, 1).await,
        Err(Error::QueueNotReady { .. })
    ));
}

#[tokio::test]
async fn test_connect_then_send_declares_durable_queue() {
    let broker = InMemoryBroker::new();
    let client = client(&broker, "publisher");

    client.connect().await.unwrap();
    assert_eq!(client.state(), QueueState::ConnectedIdle);

    client.send(PRODUCT_QUEUE, b"hello").await.unwrap();

    assert_eq!(client.state(), QueueState::ConnectedIdle);
    assert_eq!(broker.messages(PRODUCT_QUEUE), vec![b"hello".to_vec()]);
    broker.restart();
    assert!(broker.has_queue(PRODUCT_QUEUE), "queue must be declared durable");
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let broker = InMemoryBroker::new();
    let client = client(&broker, "publisher");

    client.connect().await.unwrap();
    client.connect().await.unwrap();

    assert_eq!(client.state(), QueueState::ConnectedIdle);
}

#[tokio::test]
async fn test_failed_connect_is_returned_without_retry() {
    let broker = InMemoryBroker::new();
    broker.fail_connections(true);
    let client = client(&broker, "publisher");

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, Error::QueueTransport { .. }));
    assert_eq!(client.state(), QueueState::Disconnected);

    broker.fail_connections(false);
    assert_eq!(client.state(), QueueState::Disconnected);
    client.connect().await.unwrap();
    assert_eq!(client.state(), QueueState::ConnectedIdle);
}

#[tokio::test]
async fn test_publisher_and_consumer_use_separate_channels() {
    let broker = InMemoryBroker::new();
    let publisher = client(&broker, "publisher");
    let consumer = client(&broker, "consumer");
    publisher.connect().await.unwrap();
    consumer.connect().await.unwrap();

    let _deliveries = consumer.consume(PRODUCT_QUEUE, 1).await.unwrap();

    assert_eq!(consumer.state(), QueueState::Consuming);
    assert_eq!(publisher.state(), QueueState::ConnectedIdle);

    publisher.disconnect().await;
    assert_eq!(publisher.state(), QueueState::Disconnected);
    assert_eq!(consumer.state(), QueueState::Consuming);
}

#[tokio::test]
async fn test_connection_loss_requires_explicit_reconnect() {
    let broker = InMemoryBroker::new();
    let client = client(&broker, "publisher");
    client.connect().await.unwrap();

    broker.disconnect_all();

    let err = client.send(PRODUCT_QUEUE, b"lost").await.unwrap_err();
    assert!(matches!(err, Error::QueueNotReady { .. }));
    assert_eq!(client.state(), QueueState::Disconnected);
    assert!(matches!(
        client.send(PRODUCT_QUEUE, b"still lost").await,
        Err(Error::QueueNotReady { .. })
    ));

    client.reconnect().await.unwrap();
    client.send(PRODUCT_QUEUE, b"back").await.unwrap();
    assert_eq!(broker.messages(PRODUCT_QUEUE), vec![b"back".to_vec()]);
}

#[tokio::test]
async fn test_change_publisher_sends_serialized_event() {
    let broker = InMemoryBroker::new();
    let publisher = ChangePublisher::new(client(&broker, "publisher"), PRODUCT_QUEUE);
    publisher.connect().await.unwrap();

    let event = ChangeEvent::Update {
        product: Product {
            id: 3,
            name: "Lamp".to_string(),
            price: 20.0,
        },
    };
    publisher.publish(&event).await.unwrap();

    let body = broker.messages(PRODUCT_QUEUE).remove(0);
    assert_eq!(ChangeEvent::from_payload(&body).unwrap(), event);
    assert_eq!(publisher.state(), QueueState::ConnectedIdle);
    assert_eq!(publisher.queue(), PRODUCT_QUEUE);
}

#[tokio::test]
async fn test_broker_rejection_keeps_the_channel() {
    let broker = RejectingBroker::default();
    let client = QueueClient::new("publisher", Arc::new(broker.clone()));
    client.connect().await.unwrap();

    broker.reject.store(true, Ordering::SeqCst);
    let err = client.send(PRODUCT_QUEUE, b"rejected").await.unwrap_err();
    assert!(matches!(err, Error::QueueTransport { .. }));
    assert_eq!(client.state(), QueueState::ConnectedIdle);

    broker.reject.store(false, Ordering::SeqCst);
    client.send(PRODUCT_QUEUE, b"accepted").await.unwrap();
    assert_eq!(broker.inner.messages(PRODUCT_QUEUE), vec![b"accepted".to_vec()]);
    assert_eq!(broker.opened.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_mark_disconnected_closes_the_dropped_channel() {
    let broker = RejectingBroker::default();
    let client = QueueClient::new("consumer", Arc::new(broker.clone()));
    client.connect().await.unwrap();
    let channel = Arc::clone(&broker.opened.lock().unwrap()[0]);
    assert!(channel.is_open());

    client.mark_disconnected().await;

    assert_eq!(client.state(), QueueState::Disconnected);
    assert!(!channel.is_open());

    client.reconnect().await.unwrap();
    let opened = broker.opened.lock().unwrap();
    assert_eq!(opened.len(), 2);
    assert!(!opened[0].is_open());
    assert!(opened[1].is_open());
}
