//! Change queue protocol
//!
//! Publisher and consumer each own a [`QueueClient`], i.e. a separate channel
//! over the same transport.

/// Channel lifecycle state machine
pub mod client;
/// Change consumer, handlers and delivery outcomes
pub mod consumer;
/// Bounded processed message log
pub mod log;
/// Change publisher
pub mod publisher;

pub use client::QueueClient;
pub use consumer::{ChangeConsumer, DeliveryOutcome, LoggingHandler, MessageHandler};
pub use log::ProcessedMessageLog;
pub use publisher::ChangePublisher;
