//! Processed message log
//!
//! Bounded, append-only record of message bodies the consumer handled and
//! acknowledged. Lives for the lifetime of the process; nothing persists it.

use catalog_domain::value_objects::{Delivery, ProcessedMessage};
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::RwLock;

/// In-memory log of processed queue messages, oldest first
///
/// Once `capacity` entries are held, recording a new message evicts the
/// oldest one.
#[derive(Debug)]
pub struct ProcessedMessageLog {
    entries: RwLock<VecDeque<ProcessedMessage>>,
    capacity: usize,
}

impl ProcessedMessageLog {
    /// Create an empty log holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    /// Append a processed delivery
    pub fn record(&self, delivery: &Delivery) {
        let entry = ProcessedMessage {
            body: delivery.body_text(),
            redelivered: delivery.redelivered,
            processed_at: Utc::now(),
        };
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Snapshot of every entry, oldest first
    pub fn entries(&self) -> Vec<ProcessedMessage> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Raw message bodies, oldest first
    pub fn bodies(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|e| e.body.clone())
            .collect()
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether no message has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
