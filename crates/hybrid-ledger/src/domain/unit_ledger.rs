//! # Unit Ledger
//!
//! Fungible balances and total supply. Every mutation returns the
//! `BalanceChange` the reconciler needs; nothing here knows about discrete
//! tokens. Mutations are journaled until `commit` so a failed call can be
//! rolled back.

use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use std::collections::HashMap;

/// Before/after balance of one account, produced by every mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceChange {
    /// Account whose balance changed.
    pub account: Address,
    /// Balance before the mutation.
    pub old: U256,
    /// Balance after the mutation.
    pub new: U256,
}

#[derive(Clone, Copy, Debug)]
enum UnitUndo {
    Balance(Address, U256),
    Supply(U256),
}

/// Fungible balance table.
#[derive(Clone, Debug, Default)]
pub struct UnitLedger {
    balances: HashMap<Address, U256>,
    total_supply: U256,
    journal: Vec<UnitUndo>,
}

impl UnitLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account` (zero if never credited).
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Sum of all balances.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Accounts with a non-zero balance.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    /// Adds `amount` to `account` without touching total supply.
    ///
    /// # Errors
    ///
    /// `Overflow` if the balance would wrap.
    pub fn credit(&mut self, account: Address, amount: U256) -> Result<BalanceChange, LedgerError> {
        let old = self.balance_of(&account);
        let new = old.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.store(account, new);
        Ok(BalanceChange { account, old, new })
    }

    /// Removes `amount` from `account` without touching total supply.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `amount` exceeds the balance.
    pub fn debit(&mut self, account: Address, amount: U256) -> Result<BalanceChange, LedgerError> {
        let old = self.balance_of(&account);
        let new = old
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                required: amount,
                available: old,
            })?;
        self.store(account, new);
        Ok(BalanceChange { account, old, new })
    }

    /// Credits `account` and grows total supply.
    ///
    /// # Errors
    ///
    /// `Overflow` if supply or balance would wrap.
    pub fn mint(&mut self, account: Address, amount: U256) -> Result<BalanceChange, LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        let change = self.credit(account, amount)?;
        let previous = self.total_supply;
        self.journal.push(UnitUndo::Supply(previous));
        self.total_supply = supply;
        Ok(change)
    }

    /// Debits `account` and shrinks total supply.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `amount` exceeds the balance.
    pub fn burn(&mut self, account: Address, amount: U256) -> Result<BalanceChange, LedgerError> {
        let change = self.debit(account, amount)?;
        let previous = self.total_supply;
        self.journal.push(UnitUndo::Supply(previous));
        // Balances sum to supply, so this cannot underflow once the debit passed.
        self.total_supply = self.total_supply.saturating_sub(amount);
        Ok(change)
    }

    /// Forgets the journal, making every change so far permanent.
    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    /// Undoes every change since the last commit, newest first.
    pub(crate) fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                UnitUndo::Balance(account, balance) => self.put(account, balance),
                UnitUndo::Supply(supply) => self.total_supply = supply,
            }
        }
    }

    fn store(&mut self, account: Address, balance: U256) {
        let previous = self.balance_of(&account);
        self.journal.push(UnitUndo::Balance(account, previous));
        self.put(account, balance);
    }

    fn put(&mut self, account: Address, balance: U256) {
        if balance.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, balance);
        }
    }
}
