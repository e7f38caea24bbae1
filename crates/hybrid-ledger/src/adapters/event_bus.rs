//! # Broadcast Event Bus
//!
//! Fans committed records out to any number of async subscribers through a
//! `tokio::sync::broadcast` channel. Slow subscribers lag and skip records;
//! the ledger never blocks on them.

use crate::events::EventRecord;
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Default channel capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Event sink backed by a broadcast channel.
pub struct BroadcastEventBus {
    sender: broadcast::Sender<EventRecord>,
    published: AtomicU64,
    capacity: usize,
}

impl BroadcastEventBus {
    /// Bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Bus with a custom capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// New receiver that sees every record published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for BroadcastEventBus {
    async fn publish(&self, records: &[EventRecord]) -> usize {
        let mut receivers = 0;
        for record in records {
            self.published.fetch_add(1, Ordering::Relaxed);
            match self.sender.send(record.clone()) {
                Ok(count) => {
                    debug!(
                        sequence = record.sequence,
                        topic = record.event.topic(),
                        receivers = count,
                        "Event published"
                    );
                    receivers = count;
                }
                Err(_) => {
                    warn!(
                        sequence = record.sequence,
                        topic = record.event.topic(),
                        "Event dropped (no receivers)"
                    );
                    receivers = 0;
                }
            }
        }
        receivers
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
