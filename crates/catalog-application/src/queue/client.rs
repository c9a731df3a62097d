//! Queue channel state machine
//!
//! [`QueueClient`] wraps a [`QueueConnector`] and owns at most one open
//! channel. It tracks the channel lifecycle and rejects publish/consume
//! calls that arrive without a channel instead of silently dropping them.
//!
//! ```text
//!  Disconnected ──connect──▶ Connecting ──ok──▶ ConnectedIdle
//!       ▲                        │                │      │
//!       │                      error            send  consume
//!       │                        ▼                ▼      ▼
//!       └──── connection loss ◀──┴──── Publishing      Consuming
//!                                  (channel closed)
//! ```

use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{DeliveryStream, QueueChannel, QueueConnector};
use catalog_domain::value_objects::QueueState;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

/// Connection phase of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Disconnected,
    Connecting,
    Connected,
}

struct ClientState {
    phase: Phase,
    channel: Option<Arc<dyn QueueChannel>>,
    declared: HashSet<String>,
    publishes_in_flight: usize,
    consuming: bool,
}

impl ClientState {
    fn queue_state(&self) -> QueueState {
        match self.phase {
            Phase::Disconnected => QueueState::Disconnected,
            Phase::Connecting => QueueState::Connecting,
            Phase::Connected if self.consuming => QueueState::Consuming,
            Phase::Connected if self.publishes_in_flight > 0 => QueueState::Publishing,
            Phase::Connected => QueueState::ConnectedIdle,
        }
    }

    fn reset(&mut self) -> Option<Arc<dyn QueueChannel>> {
        self.phase = Phase::Disconnected;
        self.declared.clear();
        self.publishes_in_flight = 0;
        self.consuming = false;
        self.channel.take()
    }
}

/// A single queue channel with explicit lifecycle tracking
///
/// Queues are declared durable the first time they are used on a channel.
pub struct QueueClient {
    label: String,
    connector: Arc<dyn QueueConnector>,
    state: Mutex<ClientState>,
}

impl QueueClient {
    /// Create a disconnected client
    ///
    /// `label` identifies the client in logs (e.g. "publisher").
    pub fn new(label: impl Into<String>, connector: Arc<dyn QueueConnector>) -> Self {
        Self {
            label: label.into(),
            connector,
            state: Mutex::new(ClientState {
                phase: Phase::Disconnected,
                channel: None,
                declared: HashSet::new(),
                publishes_in_flight: 0,
                consuming: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClientState> {
        // Every update leaves the state consistent, so poisoning is ignored.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current lifecycle state
    pub fn state(&self) -> QueueState {
        let mut state = self.lock();
        if state.phase == Phase::Connected
            && state.channel.as_ref().is_some_and(|c| !c.is_open())
        {
            warn!(client = %self.label, "Queue channel closed underneath the client");
            state.reset();
        }
        state.queue_state()
    }

    /// Label used in logs
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Connect and open a channel
    ///
    /// No-op when a channel is already open. Connection failures move the
    /// client back to `Disconnected` and are returned unchanged; there is no
    /// automatic retry.
    pub async fn connect(&self) -> Result<()> {
        {
            let mut state = self.lock();
            match state.phase {
                Phase::Connected if state.channel.as_ref().is_some_and(|c| c.is_open()) => {
                    return Ok(());
                }
                Phase::Connecting => {
                    return Err(Error::queue_not_ready(format!(
                        "{} connection attempt already in progress",
                        self.label
                    )));
                }
                _ => {
                    state.reset();
                    state.phase = Phase::Connecting;
                }
            }
        }

        info!(
            client = %self.label,
            provider = self.connector.provider_name(),
            "Connecting to message queue"
        );

        match self.connector.connect().await {
            Ok(channel) => {
                let mut state = self.lock();
                state.channel = Some(channel);
                state.phase = Phase::Connected;
                info!(client = %self.label, "Connected to message queue");
                Ok(())
            }
            Err(e) => {
                self.lock().reset();
                error!(client = %self.label, error = %e, "Failed to connect to message queue");
                Err(e)
            }
        }
    }

    /// Drop the current channel (if any) and connect again
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await;
        self.connect().await
    }

    /// Close the channel and move to `Disconnected`
    pub async fn disconnect(&self) {
        let channel = self.lock().reset();
        if let Some(channel) = channel {
            if let Err(e) = channel.close().await {
                debug!(client = %self.label, error = %e, "Ignoring error while closing channel");
            }
            info!(client = %self.label, "Closed message queue channel");
        }
    }

    /// Record a connection loss observed by a caller
    ///
    /// The dropped channel is closed so it does not linger on the connection.
    pub async fn mark_disconnected(&self) {
        let channel = {
            let mut state = self.lock();
            if state.phase == Phase::Disconnected {
                return;
            }
            warn!(client = %self.label, "Message queue connection lost");
            state.reset()
        };
        if let Some(channel) = channel
            && let Err(e) = channel.close().await
        {
            debug!(client = %self.label, error = %e, "Ignoring error while closing lost channel");
        }
    }

    /// Channel precondition check shared by every queue operation
    fn ready_channel(&self, operation: &str) -> Result<Arc<dyn QueueChannel>> {
        let mut state = self.lock();
        if state.phase == Phase::Connected {
            if let Some(channel) = state.channel.as_ref().filter(|c| c.is_open()) {
                return Ok(Arc::clone(channel));
            }
            state.reset();
            warn!(client = %self.label, "Message queue channel found closed");
            return Err(Error::queue_not_ready(format!(
                "cannot {operation}: {} channel was closed, reconnect first",
                self.label
            )));
        }
        Err(Error::queue_not_ready(format!(
            "cannot {operation}: {} channel not initialized",
            self.label
        )))
    }

    async fn ensure_declared(&self, channel: &Arc<dyn QueueChannel>, queue: &str) -> Result<()> {
        if self.lock().declared.contains(queue) {
            return Ok(());
        }
        channel.declare_queue(queue, true).await?;
        self.lock().declared.insert(queue.to_string());
        debug!(client = %self.label, queue, "Declared durable queue");
        Ok(())
    }

    /// Turn a transport failure into a state transition before returning it
    ///
    /// Only a channel that is no longer open counts as a connection loss; a
    /// broker rejection on an open channel leaves the client connected.
    async fn observe(&self, channel: &Arc<dyn QueueChannel>, error: Error) -> Error {
        if !error.is_queue_transport() {
            return error;
        }
        if channel.is_open() {
            warn!(client = %self.label, error = %error, "Queue operation rejected by the broker");
        } else {
            self.mark_disconnected().await;
        }
        error
    }

    /// Publish a message, returning once the broker accepted it
    pub async fn send(&self, queue: &str, payload: &[u8]) -> Result<()> {
        let channel = self.ready_channel("send")?;
        if let Err(e) = self.ensure_declared(&channel, queue).await {
            return Err(self.observe(&channel, e).await);
        }

        self.lock().publishes_in_flight += 1;
        let result = channel.send(queue, payload).await;
        {
            let mut state = self.lock();
            state.publishes_in_flight = state.publishes_in_flight.saturating_sub(1);
        }

        if let Err(e) = result {
            return Err(self.observe(&channel, e).await);
        }
        debug!(client = %self.label, queue, bytes = payload.len(), "Message sent to queue");
        Ok(())
    }

    /// Start consuming; the client stays in `Consuming` afterwards
    pub async fn consume(&self, queue: &str, prefetch: u16) -> Result<DeliveryStream> {
        let channel = self.ready_channel("consume")?;
        if let Err(e) = self.ensure_declared(&channel, queue).await {
            return Err(self.observe(&channel, e).await);
        }

        let stream = match channel.consume(queue, prefetch).await {
            Ok(stream) => stream,
            Err(e) => return Err(self.observe(&channel, e).await),
        };
        self.lock().consuming = true;
        info!(client = %self.label, queue, prefetch, "Started consuming from queue");
        Ok(stream)
    }

    /// Acknowledge a delivery
    pub async fn ack(&self, delivery_tag: u64) -> Result<()> {
        let channel = self.ready_channel("ack")?;
        match channel.ack(delivery_tag).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.observe(&channel, e).await),
        }
    }

    /// Reject a delivery, optionally requeueing it
    pub async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        let channel = self.ready_channel("nack")?;
        match channel.nack(delivery_tag, requeue).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.observe(&channel, e).await),
        }
    }
}

impl std::fmt::Debug for QueueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueClient")
            .field("label", &self.label)
            .field("provider", &self.connector.provider_name())
            .field("state", &self.lock().queue_state())
            .finish()
    }
}
