//! # Reclaim Queue (Bank)
//!
//! FIFO store of surrendered discrete token ids. Ids enter at the back when
//! an account loses a whole unit and leave from the front when an account
//! gains one, so the longest-banked id is always reissued first.

use crate::domain::value_objects::TokenId;
use crate::errors::LedgerError;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug)]
enum QueueUndo {
    Enqueued,
    Dequeued(TokenId),
}

/// FIFO queue of banked token ids.
#[derive(Clone, Debug, Default)]
pub struct ReclaimQueue {
    queue: VecDeque<TokenId>,
    journal: Vec<QueueUndo>,
}

impl ReclaimQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of banked ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is banked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Id at `index` (0 = next to be reissued).
    #[must_use]
    pub fn peek(&self, index: usize) -> Option<TokenId> {
        self.queue.get(index).copied()
    }

    /// Banked ids, front first.
    pub fn iter(&self) -> impl Iterator<Item = &TokenId> {
        self.queue.iter()
    }

    pub(crate) fn enqueue(&mut self, id: TokenId) {
        self.queue.push_back(id);
        self.journal.push(QueueUndo::Enqueued);
    }

    pub(crate) fn dequeue(&mut self) -> Result<TokenId, LedgerError> {
        let id = self.queue.pop_front().ok_or(LedgerError::QueueEmpty)?;
        self.journal.push(QueueUndo::Dequeued(id));
        Ok(id)
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Puts reissued ids back at the front and drops newly banked ones.
    pub(crate) fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                QueueUndo::Enqueued => {
                    self.queue.pop_back();
                }
                QueueUndo::Dequeued(id) => self.queue.push_front(id),
            }
        }
    }
}
