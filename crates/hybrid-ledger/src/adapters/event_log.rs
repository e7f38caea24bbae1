//! # In-Memory Event Log
//!
//! Append-only record of every committed event. Replaying the log rebuilds
//! the ownership map from `TokenTransfer` records and fungible balances from
//! `Transfer` records, which makes it a cheap external audit of the ledger.

use crate::domain::value_objects::{Address, TokenId, U256};
use crate::events::{EventRecord, LedgerEvent};
use crate::ports::outbound::EventSink;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event sink that keeps every record in memory.
#[derive(Default)]
pub struct InMemoryEventLog {
    records: RwLock<Vec<EventRecord>>,
    published: AtomicU64,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, in commit order.
    #[must_use]
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.read().clone()
    }

    /// Records whose event carries the given topic.
    #[must_use]
    pub fn records_with_topic(&self, topic: &str) -> Vec<EventRecord> {
        self.records
            .read()
            .iter()
            .filter(|r| r.event.topic() == topic)
            .cloned()
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// JSON array of every record.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.records.read())
    }

    /// Current holder of every id, rebuilt from `TokenTransfer` records.
    ///
    /// Ids whose last movement was to the zero address are banked and absent.
    #[must_use]
    pub fn replay_owners(&self) -> HashMap<TokenId, Address> {
        let mut owners = HashMap::new();
        for record in self.records.read().iter() {
            if let LedgerEvent::TokenTransfer { to, id, .. } = &record.event {
                if to.is_zero() {
                    owners.remove(id);
                } else {
                    owners.insert(*id, *to);
                }
            }
        }
        owners
    }

    /// Fungible balances rebuilt from `Transfer` records.
    #[must_use]
    pub fn replay_balances(&self) -> HashMap<Address, U256> {
        let mut balances: HashMap<Address, U256> = HashMap::new();
        for record in self.records.read().iter() {
            if let LedgerEvent::Transfer { from, to, amount } = &record.event {
                if from == to {
                    continue;
                }
                if !from.is_zero() {
                    let entry = balances.entry(*from).or_default();
                    *entry = entry.saturating_sub(*amount);
                }
                if !to.is_zero() {
                    let entry = balances.entry(*to).or_default();
                    *entry = entry.saturating_add(*amount);
                }
            }
        }
        balances.retain(|_, balance| !balance.is_zero());
        balances
    }
}

#[async_trait]
impl EventSink for InMemoryEventLog {
    async fn publish(&self, records: &[EventRecord]) -> usize {
        self.records.write().extend_from_slice(records);
        self.published
            .fetch_add(records.len() as u64, Ordering::Relaxed);
        1
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
