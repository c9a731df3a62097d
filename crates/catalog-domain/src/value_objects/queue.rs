//! Queue deliveries and channel lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a queue channel
///
/// ```text
/// Disconnected -> Connecting -> ConnectedIdle -> Publishing -> ConnectedIdle
///                                             -> Consuming
/// (any) -> Disconnected on connection loss
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueState {
    /// No channel; publish and consume are rejected
    Disconnected,
    /// Handshake in progress
    Connecting,
    /// Channel open, nothing in flight
    ConnectedIdle,
    /// A send is waiting for broker acceptance
    Publishing,
    /// A subscription is active
    Consuming,
}

impl QueueState {
    /// Whether the channel exists and accepts operations
    pub fn has_channel(&self) -> bool {
        matches!(self, Self::ConnectedIdle | Self::Publishing | Self::Consuming)
    }
}

impl fmt::Display for QueueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::ConnectedIdle => "connected-idle",
            Self::Publishing => "publishing",
            Self::Consuming => "consuming",
        };
        f.write_str(name)
    }
}

/// A message handed to a consumer, awaiting ack or nack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Queue the message was consumed from
    pub queue: String,
    /// Broker tag used to acknowledge this delivery
    pub delivery_tag: u64,
    /// Raw message body
    pub body: Vec<u8>,
    /// Set when the message was delivered before without an ack
    pub redelivered: bool,
}

impl Delivery {
    /// Body as text, replacing invalid UTF-8
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Entry of the consumer's processed message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedMessage {
    /// Raw message body
    pub body: String,
    /// Whether the message had been delivered before
    pub redelivered: bool,
    /// When the handler completed
    pub processed_at: DateTime<Utc>,
}
