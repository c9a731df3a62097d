//! Tests for the in-process broker
//!
//! Exercise the delivery rules the change consumer depends on: FIFO order,
//! prefetch, ack removal, requeue with `redelivered`, and durability across
//! restarts.

use catalog_domain::error::Error;
use catalog_domain::ports::{QueueChannel, QueueConnector};
use catalog_providers::queue::InMemoryBroker;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

const QUEUE: &str = "product_queue";

async fn declared_channel(broker: &InMemoryBroker) -> Arc<dyn QueueChannel> {
    let channel = broker.connect().await.unwrap();
    channel.declare_queue(QUEUE, true).await.unwrap();
    channel
}

#[tokio::test]
async fn test_messages_are_delivered_in_publish_order() {
    let broker = InMemoryBroker::new();
    let publisher = declared_channel(&broker).await;
    let consumer = declared_channel(&broker).await;

    for body in [b"one".as_slice(), b"two", b"three"] {
        publisher.send(QUEUE, body).await.unwrap();
    }

    let mut stream = consumer.consume(QUEUE, 1).await.unwrap();
    let mut bodies = Vec::new();
    for _ in 0..3 {
        let delivery = stream.next().await.unwrap().unwrap();
        bodies.push(delivery.body.clone());
        consumer.ack(delivery.delivery_tag).await.unwrap();
    }

    assert_eq!(bodies, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    assert_eq!(broker.queue_len(QUEUE), 0);
    assert_eq!(broker.unacked_count(QUEUE), 0);
}

#[tokio::test]
async fn test_prefetch_holds_back_until_ack() {
    let broker = InMemoryBroker::new();
    let channel = declared_channel(&broker).await;
    channel.send(QUEUE, b"first").await.unwrap();
    channel.send(QUEUE, b"second").await.unwrap();

    let mut stream = channel.consume(QUEUE, 1).await.unwrap();
    let first = stream.next().await.unwrap().unwrap();

    let blocked = tokio::time::timeout(Duration::from_millis(50), stream.next()).await;
    assert!(blocked.is_err(), "second message must wait for the first ack");
    assert_eq!(broker.unacked_count(QUEUE), 1);

    channel.ack(first.delivery_tag).await.unwrap();
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.body, b"second");
}

#[tokio::test]
async fn test_nack_with_requeue_redelivers_identical_body() {
    let broker = InMemoryBroker::new();
    let channel = declared_channel(&broker).await;
    channel.send(QUEUE, br#"{"action":"delete","productId":1}"#).await.unwrap();

    let mut stream = channel.consume(QUEUE, 1).await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert!(!first.redelivered);
    channel.nack(first.delivery_tag, true).await.unwrap();

    let again = stream.next().await.unwrap().unwrap();
    assert!(again.redelivered);
    assert_eq!(again.body, first.body);
    assert_ne!(again.delivery_tag, first.delivery_tag);
}

#[tokio::test]
async fn test_nack_without_requeue_drops_message() {
    let broker = InMemoryBroker::new();
    let channel = declared_channel(&broker).await;
    channel.send(QUEUE, b"poison").await.unwrap();

    let mut stream = channel.consume(QUEUE, 1).await.unwrap();
    let delivery = stream.next().await.unwrap().unwrap();
    channel.nack(delivery.delivery_tag, false).await.unwrap();

    assert_eq!(broker.queue_len(QUEUE), 0);
    assert_eq!(broker.unacked_count(QUEUE), 0);
}

#[tokio::test]
async fn test_closing_channel_requeues_unacked() {
    let broker = InMemoryBroker::new();
    let publisher = declared_channel(&broker).await;
    publisher.send(QUEUE, b"in-flight").await.unwrap();

    let consumer = declared_channel(&broker).await;
    let mut stream = consumer.consume(QUEUE, 1).await.unwrap();
    let _unacked = stream.next().await.unwrap().unwrap();
    consumer.close().await.unwrap();

    assert!(stream.next().await.is_none());
    assert!(!consumer.is_open());
    assert_eq!(broker.queue_len(QUEUE), 1);

    let replacement = declared_channel(&broker).await;
    let mut stream = replacement.consume(QUEUE, 1).await.unwrap();
    let delivery = stream.next().await.unwrap().unwrap();
    assert!(delivery.redelivered);
    assert_eq!(delivery.body, b"in-flight");
}

#[tokio::test]
async fn test_connection_loss_surfaces_on_stream() {
    let broker = InMemoryBroker::new();
    let channel = declared_channel(&broker).await;
    let mut stream = channel.consume(QUEUE, 1).await.unwrap();

    broker.disconnect_all();

    let item = stream.next().await.unwrap();
    assert!(matches!(item, Err(Error::QueueTransport { .. })));
    assert!(stream.next().await.is_none());
    assert!(!channel.is_open());
    assert!(channel.send(QUEUE, b"late").await.is_err());
}

#[tokio::test]
async fn test_durable_queue_survives_restart() {
    let broker = InMemoryBroker::new();
    let channel = broker.connect().await.unwrap();
    channel.declare_queue(QUEUE, true).await.unwrap();
    channel.declare_queue("scratch", false).await.unwrap();
    channel.send(QUEUE, b"kept").await.unwrap();
    channel.send("scratch", b"lost").await.unwrap();

    broker.restart();

    assert!(broker.has_queue(QUEUE));
    assert!(!broker.has_queue("scratch"));
    assert_eq!(broker.messages(QUEUE), vec![b"kept".to_vec()]);
}

#[tokio::test]
async fn test_send_to_undeclared_queue_fails() {
    let broker = InMemoryBroker::new();
    let channel = broker.connect().await.unwrap();

    let err = channel.send("nowhere", b"x").await.unwrap_err();
    assert!(matches!(err, Error::QueueTransport { .. }));
}

#[tokio::test]
async fn test_refused_connection() {
    let broker = InMemoryBroker::new();
    broker.fail_connections(true);
    assert!(broker.connect().await.is_err());

    broker.fail_connections(false);
    assert!(broker.connect().await.is_ok());
}
