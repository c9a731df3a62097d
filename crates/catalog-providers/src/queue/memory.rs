//! In-process message broker
//!
//! Implements the AMQP delivery rules the catalog relies on without a
//! network:
//!
//! - messages wait in FIFO order until a consumer takes them;
//! - a delivery stays pending until acked;
//! - nack with requeue, closing the channel or losing the connection puts
//!   pending messages back at the head of the queue with `redelivered` set;
//! - durable queues and their messages survive [`InMemoryBroker::restart`].
//!
//! Clones share the same broker, so a connector handed to both publisher and
//! consumer connects them to the same queues.

use async_trait::async_trait;
use catalog_domain::error::{Error, Result};
use catalog_domain::ports::{DeliveryStream, QueueChannel, QueueConnector};
use catalog_domain::value_objects::Delivery;
use futures::stream;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tracing::debug;

#[derive(Debug, Clone)]
struct Message {
    body: Vec<u8>,
    redelivered: bool,
}

#[derive(Debug, Default)]
struct QueueSlot {
    durable: bool,
    ready: VecDeque<Message>,
}

#[derive(Debug)]
struct Pending {
    channel: u64,
    queue: String,
    message: Message,
}

#[derive(Debug, Clone, Copy)]
struct ChannelSlot {
    open: bool,
    lost: bool,
}

#[derive(Debug, Default)]
struct BrokerState {
    queues: HashMap<String, QueueSlot>,
    pending: HashMap<u64, Pending>,
    channels: HashMap<u64, ChannelSlot>,
    next_tag: u64,
    next_channel: u64,
    refuse_connections: bool,
}

enum Next {
    Ready(Delivery),
    Wait,
    Closed,
    Lost,
}

impl BrokerState {
    fn channel_open(&self, channel: u64) -> bool {
        self.channels.get(&channel).is_some_and(|c| c.open)
    }

    /// Put every pending delivery of `channel` back at the head of its queue
    fn requeue_channel(&mut self, channel: u64) {
        let mut tags: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, p)| p.channel == channel)
            .map(|(tag, _)| *tag)
            .collect();
        // Newest first, so the oldest ends up at the very front.
        tags.sort_unstable_by(|a, b| b.cmp(a));
        for tag in tags {
            if let Some(pending) = self.pending.remove(&tag) {
                self.requeue(pending);
            }
        }
    }

    /// Remove a pending delivery owned by `channel`
    fn take_pending(&mut self, channel: u64, tag: u64) -> Option<Pending> {
        if self.pending.get(&tag).is_some_and(|p| p.channel == channel) {
            self.pending.remove(&tag)
        } else {
            None
        }
    }

    fn requeue(&mut self, pending: Pending) {
        if let Some(slot) = self.queues.get_mut(&pending.queue) {
            slot.ready.push_front(Message {
                body: pending.message.body,
                redelivered: true,
            });
        }
    }

    fn next_delivery(&mut self, channel: u64, queue: &str, prefetch: usize) -> Next {
        let Some(slot) = self.channels.get(&channel) else {
            return Next::Closed;
        };
        if slot.lost {
            return Next::Lost;
        }
        if !slot.open {
            return Next::Closed;
        }

        let in_flight = self
            .pending
            .values()
            .filter(|p| p.channel == channel && p.queue == queue)
            .count();
        if in_flight >= prefetch {
            return Next::Wait;
        }

        let Some(message) = self.queues.get_mut(queue).and_then(|q| q.ready.pop_front()) else {
            return Next::Wait;
        };

        self.next_tag += 1;
        let tag = self.next_tag;
        let delivery = Delivery {
            queue: queue.to_string(),
            delivery_tag: tag,
            body: message.body.clone(),
            redelivered: message.redelivered,
        };
        self.pending.insert(
            tag,
            Pending {
                channel,
                queue: queue.to_string(),
                message,
            },
        );
        Next::Ready(delivery)
    }
}

#[derive(Debug, Default)]
struct BrokerInner {
    state: Mutex<BrokerState>,
    changed: Notify,
}

impl BrokerInner {
    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// In-process broker, also usable as a [`QueueConnector`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    inner: Arc<BrokerInner>,
}

impl InMemoryBroker {
    /// Create an empty broker
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent connection attempts fail (broker unreachable)
    pub fn fail_connections(&self, refuse: bool) {
        self.inner.lock().refuse_connections = refuse;
    }

    /// Drop every open channel as if the connection was lost
    ///
    /// Pending deliveries are requeued and active consumers receive an error.
    pub fn disconnect_all(&self) {
        {
            let mut state = self.inner.lock();
            let open: Vec<u64> = state
                .channels
                .iter()
                .filter(|(_, c)| c.open)
                .map(|(id, _)| *id)
                .collect();
            for id in open {
                state.channels.insert(
                    id,
                    ChannelSlot {
                        open: false,
                        lost: true,
                    },
                );
                state.requeue_channel(id);
            }
        }
        self.inner.changed.notify_waiters();
    }

    /// Simulate a broker restart: connections drop, non-durable queues vanish
    pub fn restart(&self) {
        self.disconnect_all();
        self.inner.lock().queues.retain(|_, q| q.durable);
    }

    /// Whether `queue` has been declared
    pub fn has_queue(&self, queue: &str) -> bool {
        self.inner.lock().queues.contains_key(queue)
    }

    /// Number of messages waiting for a consumer
    pub fn queue_len(&self, queue: &str) -> usize {
        self.inner.lock().queues.get(queue).map_or(0, |q| q.ready.len())
    }

    /// Number of delivered but unacknowledged messages
    pub fn unacked_count(&self, queue: &str) -> usize {
        self.inner
            .lock()
            .pending
            .values()
            .filter(|p| p.queue == queue)
            .count()
    }

    /// Bodies waiting in `queue`, head first
    pub fn messages(&self, queue: &str) -> Vec<Vec<u8>> {
        self.inner
            .lock()
            .queues
            .get(queue)
            .map(|q| q.ready.iter().map(|m| m.body.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QueueConnector for InMemoryBroker {
    async fn connect(&self) -> Result<Arc<dyn QueueChannel>> {
        let mut state = self.inner.lock();
        if state.refuse_connections {
            return Err(Error::queue_transport("in-memory broker refused the connection"));
        }
        state.next_channel += 1;
        let id = state.next_channel;
        state.channels.insert(
            id,
            ChannelSlot {
                open: true,
                lost: false,
            },
        );
        debug!(channel_id = id, "Opened in-memory channel");

        Ok(Arc::new(InMemoryChannel {
            id,
            inner: Arc::clone(&self.inner),
        }))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

/// Channel on an [`InMemoryBroker`]
#[derive(Debug)]
pub struct InMemoryChannel {
    id: u64,
    inner: Arc<BrokerInner>,
}

impl InMemoryChannel {
    fn closed_error(&self) -> Error {
        Error::queue_transport(format!("in-memory channel {} is closed", self.id))
    }
}

#[async_trait]
impl QueueChannel for InMemoryChannel {
    async fn declare_queue(&self, queue: &str, durable: bool) -> Result<()> {
        let mut state = self.inner.lock();
        if !state.channel_open(self.id) {
            return Err(self.closed_error());
        }
        state
            .queues
            .entry(queue.to_string())
            .or_insert_with(|| QueueSlot {
                durable,
                ready: VecDeque::new(),
            });
        Ok(())
    }

    async fn send(&self, queue: &str, payload: &[u8]) -> Result<()> {
        {
            let mut state = self.inner.lock();
            if !state.channel_open(self.id) {
                return Err(self.closed_error());
            }
            let slot = state.queues.get_mut(queue).ok_or_else(|| {
                Error::queue_transport(format!("no queue '{queue}' has been declared"))
            })?;
            slot.ready.push_back(Message {
                body: payload.to_vec(),
                redelivered: false,
            });
        }
        self.inner.changed.notify_waiters();
        Ok(())
    }

    async fn consume(&self, queue: &str, prefetch: u16) -> Result<DeliveryStream> {
        {
            let state = self.inner.lock();
            if !state.channel_open(self.id) {
                return Err(self.closed_error());
            }
            if !state.queues.contains_key(queue) {
                return Err(Error::queue_transport(format!(
                    "no queue '{queue}' has been declared"
                )));
            }
        }

        let cursor = Cursor {
            inner: Arc::clone(&self.inner),
            channel: self.id,
            queue: queue.to_string(),
            prefetch: usize::from(prefetch.max(1)),
            finished: false,
        };
        Ok(Box::pin(stream::unfold(cursor, |mut cursor| async move {
            if cursor.finished {
                return None;
            }
            let item = cursor.recv().await?;
            cursor.finished = item.is_err();
            Some((item, cursor))
        })))
    }

    async fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.inner
            .lock()
            .take_pending(self.id, delivery_tag)
            .ok_or_else(|| Error::queue_transport(format!("unknown delivery tag {delivery_tag}")))?;
        self.inner.changed.notify_waiters();
        Ok(())
    }

    async fn nack(&self, delivery_tag: u64, requeue: bool) -> Result<()> {
        {
            let mut state = self.inner.lock();
            let pending = state.take_pending(self.id, delivery_tag).ok_or_else(|| {
                Error::queue_transport(format!("unknown delivery tag {delivery_tag}"))
            })?;
            if requeue {
                state.requeue(pending);
            }
        }
        self.inner.changed.notify_waiters();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        {
            let mut state = self.inner.lock();
            if let Some(slot) = state.channels.get_mut(&self.id) {
                slot.open = false;
            }
            state.requeue_channel(self.id);
        }
        self.inner.changed.notify_waiters();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.inner.lock().channel_open(self.id)
    }
}

/// Consumer position of one subscription
struct Cursor {
    inner: Arc<BrokerInner>,
    channel: u64,
    queue: String,
    prefetch: usize,
    finished: bool,
}

impl Cursor {
    /// Wait for the next delivery; `None` once the channel is closed
    async fn recv(&self) -> Option<Result<Delivery>> {
        loop {
            let notified = self.inner.changed.notified();
            tokio::pin!(notified);
            // Register before checking so a notification in between is not lost.
            notified.as_mut().enable();

            let next = self
                .inner
                .lock()
                .next_delivery(self.channel, &self.queue, self.prefetch);
            match next {
                Next::Ready(delivery) => return Some(Ok(delivery)),
                Next::Closed => return None,
                Next::Lost => {
                    return Some(Err(Error::queue_transport(format!(
                        "connection to in-memory broker lost (channel {})",
                        self.channel
                    ))));
                }
                Next::Wait => notified.await,
            }
        }
    }
}

use catalog_application::ports::registry::{
    QUEUE_PROVIDERS, QueueProviderConfig, QueueProviderEntry,
};

#[linkme::distributed_slice(QUEUE_PROVIDERS)]
static MEMORY_QUEUE: QueueProviderEntry = QueueProviderEntry {
    name: "memory",
    description: "In-process broker with durable queues and redelivery",
    factory: |_: &QueueProviderConfig| Ok(Arc::new(InMemoryBroker::new())),
};
