//! # Discrete Token Registry
//!
//! Tracks every discrete token ever minted: who holds it (or that it sits in
//! the bank), its per-token approval, and its slot in the holder's owned
//! stack. Ids are never destroyed; `minted` only grows.
//!
//! Owned stacks are LIFO. Reclamation always takes the top of the stack;
//! moving a specific id removes it in place, so the remaining ids keep their
//! acquisition order and the most recent one stays on top.
//!
//! Every mutation is journaled until the next `commit`; `rollback` undoes
//! them newest first.

use crate::domain::value_objects::{Address, TokenId, U256};
use crate::errors::LedgerError;
use std::collections::HashMap;

// =============================================================================
// TOKEN STATE
// =============================================================================

/// Lifecycle state of a minted token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// Held by an account.
    Owned(Address),
    /// Sitting in the reclaim queue.
    Banked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TokenRecord {
    state: TokenState,
    approved: Option<Address>,
    /// Slot in the holder's stack; meaningless while banked.
    index: usize,
}

// =============================================================================
// OWNED STACK
// =============================================================================

/// Ids owned by one account, most recently received on top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnedStack {
    ids: Vec<TokenId>,
}

impl OwnedStack {
    /// Number of owned ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if nothing is owned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Most recently received id.
    #[must_use]
    pub fn top(&self) -> Option<TokenId> {
        self.ids.last().copied()
    }

    /// Ids bottom to top.
    #[must_use]
    pub fn as_slice(&self) -> &[TokenId] {
        &self.ids
    }

    fn push(&mut self, id: TokenId) -> usize {
        self.ids.push(id);
        self.ids.len() - 1
    }

    fn pop(&mut self) -> Option<TokenId> {
        self.ids.pop()
    }

    /// Removes the id at `index`, shifting every later id down one slot.
    fn remove(&mut self, index: usize) -> Option<TokenId> {
        (index < self.ids.len()).then(|| self.ids.remove(index))
    }

    fn insert(&mut self, index: usize, id: TokenId) {
        let index = index.min(self.ids.len());
        self.ids.insert(index, id);
    }
}

/// Inverse of one registry mutation.
#[derive(Clone, Debug)]
enum RegistryUndo {
    Minted(u64),
    Record(u64, Option<TokenRecord>),
    Pushed(Address),
    Popped(Address, TokenId),
    Removed(Address, usize, TokenId),
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Registry of minted discrete tokens and their holders.
#[derive(Clone, Debug, Default)]
pub struct DiscreteTokenRegistry {
    minted: u64,
    records: HashMap<u64, TokenRecord>,
    stacks: HashMap<Address, OwnedStack>,
    journal: Vec<RegistryUndo>,
}

impl DiscreteTokenRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest sequence number ever minted.
    #[must_use]
    pub fn minted(&self) -> u64 {
        self.minted
    }

    /// Current holder of `raw`.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` outside the id space, `NotFound` when unissued or banked.
    pub fn owner_of(&self, raw: U256) -> Result<Address, LedgerError> {
        let id = TokenId::parse(raw)?;
        match self.state_of(id) {
            Some(TokenState::Owned(owner)) => Ok(owner),
            Some(TokenState::Banked) | None => Err(LedgerError::NotFound(raw)),
        }
    }

    /// State of `id`, or None if never minted.
    #[must_use]
    pub fn state_of(&self, id: TokenId) -> Option<TokenState> {
        self.record(id).map(|record| record.state)
    }

    /// Recorded stack slot of an owned id.
    #[must_use]
    pub fn slot_of(&self, id: TokenId) -> Option<usize> {
        self.record(id)
            .filter(|record| matches!(record.state, TokenState::Owned(_)))
            .map(|record| record.index)
    }

    /// Approved address for `id`, if any. Requires the id to be owned.
    ///
    /// # Errors
    ///
    /// Same as [`Self::owner_of`].
    pub fn get_approved(&self, raw: U256) -> Result<Option<Address>, LedgerError> {
        self.owner_of(raw)?;
        let id = TokenId::parse(raw)?;
        Ok(self.record(id).and_then(|record| record.approved))
    }

    /// Ids held by `account`, bottom to top.
    #[must_use]
    pub fn owned(&self, account: &Address) -> &[TokenId] {
        self.stacks
            .get(account)
            .map(OwnedStack::as_slice)
            .unwrap_or_default()
    }

    /// Number of ids held by `account`.
    #[must_use]
    pub fn owned_count(&self, account: &Address) -> usize {
        self.stacks.get(account).map_or(0, OwnedStack::len)
    }

    /// All non-empty stacks.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &OwnedStack)> {
        self.stacks.iter()
    }

    /// All minted ids with their states.
    pub fn states(&self) -> impl Iterator<Item = (TokenId, TokenState)> + '_ {
        self.records
            .iter()
            .map(|(seq, record)| (TokenId::from_sequence(*seq), record.state))
    }

    // ===== MUTATIONS (reconciler and ledger only) =====

    /// Mints the next id and hands it to `to`.
    pub(crate) fn issue_new(&mut self, to: Address) -> Result<TokenId, LedgerError> {
        let sequence = self.minted.checked_add(1).ok_or(LedgerError::Overflow)?;
        let previous = std::mem::replace(&mut self.minted, sequence);
        self.journal.push(RegistryUndo::Minted(previous));
        let id = TokenId::from_sequence(sequence);
        let previous = self.records.insert(
            sequence,
            TokenRecord {
                state: TokenState::Banked,
                approved: None,
                index: 0,
            },
        );
        self.journal.push(RegistryUndo::Record(sequence, previous));
        self.assign(id, to)?;
        Ok(id)
    }

    /// Pushes a banked id onto `to`'s stack.
    pub(crate) fn assign(&mut self, id: TokenId, to: Address) -> Result<(), LedgerError> {
        let index = self.stacks.entry(to).or_default().push(id);
        self.journal.push(RegistryUndo::Pushed(to));
        let record = self.record_mut(id)?;
        record.state = TokenState::Owned(to);
        record.approved = None;
        record.index = index;
        Ok(())
    }

    /// Pops the most recently received id from `account` and marks it banked.
    pub(crate) fn surrender_top(&mut self, account: Address) -> Result<TokenId, LedgerError> {
        let id = self
            .stacks
            .get_mut(&account)
            .and_then(OwnedStack::pop)
            .ok_or_else(|| {
                LedgerError::InvariantViolation(format!(
                    "{account:?} has no discrete token to surrender"
                ))
            })?;
        self.journal.push(RegistryUndo::Popped(account, id));
        self.prune(&account);
        let record = self.record_mut(id)?;
        record.state = TokenState::Banked;
        record.approved = None;
        Ok(id)
    }

    /// Moves a specific id from `from` to `to` without touching the bank.
    ///
    /// Ids `from` acquired later slide down one slot, so its stack order is
    /// unchanged apart from the gap closing.
    pub(crate) fn transfer_specific(
        &mut self,
        id: TokenId,
        from: Address,
        to: Address,
    ) -> Result<(), LedgerError> {
        let index = match self.record(id) {
            Some(record) if record.state == TokenState::Owned(from) => record.index,
            _ => {
                return Err(LedgerError::InvariantViolation(format!(
                    "{id:?} is not held by {from:?}"
                )))
            }
        };
        let removed = self
            .stacks
            .get_mut(&from)
            .and_then(|stack| stack.remove(index));
        let Some(removed) = removed else {
            return Err(LedgerError::InvariantViolation(format!(
                "{from:?} has no slot {index}"
            )));
        };
        self.journal.push(RegistryUndo::Removed(from, index, removed));
        if removed != id {
            return Err(LedgerError::InvariantViolation(format!(
                "{id:?} is not at slot {index} of {from:?}'s stack"
            )));
        }
        let later = self.owned(&from).get(index..).unwrap_or_default().to_vec();
        for shifted in later {
            let record = self.record_mut(shifted)?;
            record.index = record.index.saturating_sub(1);
        }
        self.prune(&from);
        self.assign(id, to)
    }

    pub(crate) fn set_approved(
        &mut self,
        id: TokenId,
        approved: Option<Address>,
    ) -> Result<(), LedgerError> {
        self.record_mut(id)?.approved = approved;
        Ok(())
    }

    fn record(&self, id: TokenId) -> Option<&TokenRecord> {
        id.sequence().and_then(|seq| self.records.get(&seq))
    }

    /// Mutable record access; journals the record as it was.
    fn record_mut(&mut self, id: TokenId) -> Result<&mut TokenRecord, LedgerError> {
        let sequence = id.sequence().ok_or(LedgerError::NotFound(id.as_u256()))?;
        let record = self
            .records
            .get_mut(&sequence)
            .ok_or(LedgerError::NotFound(id.as_u256()))?;
        self.journal
            .push(RegistryUndo::Record(sequence, Some(*record)));
        Ok(record)
    }

    fn prune(&mut self, account: &Address) {
        if self.stacks.get(account).is_some_and(OwnedStack::is_empty) {
            self.stacks.remove(account);
        }
    }

    // ===== JOURNAL =====

    /// Forgets the journal, making every change so far permanent.
    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Undoes every change since the last commit, newest first.
    pub(crate) fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                RegistryUndo::Minted(minted) => self.minted = minted,
                RegistryUndo::Record(sequence, Some(record)) => {
                    self.records.insert(sequence, record);
                }
                RegistryUndo::Record(sequence, None) => {
                    self.records.remove(&sequence);
                }
                RegistryUndo::Pushed(account) => {
                    if let Some(stack) = self.stacks.get_mut(&account) {
                        stack.pop();
                    }
                    self.prune(&account);
                }
                RegistryUndo::Popped(account, id) => {
                    self.stacks.entry(account).or_default().push(id);
                }
                RegistryUndo::Removed(account, index, id) => {
                    self.stacks.entry(account).or_default().insert(index, id);
                }
            }
        }
    }
}
