//! # Transfer Reconciler
//!
//! Keeps discrete ownership in step with fungible balances. Every
//! `BalanceChange` produced by the unit ledger passes through here:
//!
//! | Whole-unit delta | Effect |
//! |------------------|--------|
//! | account exempt | none |
//! | decrease by n | pop n ids from the owned stack (LIFO), enqueue each in the bank |
//! | increase by n | n times: dequeue the oldest banked id, or mint a new one; assign it |
//! | unchanged | none |
//!
//! Callers reconcile the sender before the receiver so that ids freed by one
//! side of a transfer are available to the other.

use crate::domain::exemption::ExemptionRegistry;
use crate::domain::reclaim_queue::ReclaimQueue;
use crate::domain::registry::DiscreteTokenRegistry;
use crate::domain::unit_ledger::BalanceChange;
use crate::domain::value_objects::{whole_units, Address, TokenId, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;

/// Discrete movements produced by one reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Ids moved from the account into the bank, in order.
    pub reclaimed: Vec<TokenId>,
    /// Ids taken back out of the bank, in order.
    pub reissued: Vec<TokenId>,
    /// Freshly minted ids, in order.
    pub minted: Vec<TokenId>,
}

impl ReconcileOutcome {
    /// Folds another outcome into this one.
    pub fn absorb(&mut self, other: Self) {
        self.reclaimed.extend(other.reclaimed);
        self.reissued.extend(other.reissued);
        self.minted.extend(other.minted);
    }
}

/// Borrowed view over the components a reconciliation touches.
pub struct Reconciler<'a> {
    registry: &'a mut DiscreteTokenRegistry,
    bank: &'a mut ReclaimQueue,
    exemptions: &'a ExemptionRegistry,
    unit: U256,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over the given components.
    pub fn new(
        registry: &'a mut DiscreteTokenRegistry,
        bank: &'a mut ReclaimQueue,
        exemptions: &'a ExemptionRegistry,
        unit: U256,
    ) -> Self {
        Self {
            registry,
            bank,
            exemptions,
            unit,
        }
    }

    /// Applies the discrete effect of one balance change.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` if the account owns fewer ids than it must
    /// surrender, `Overflow` if the delta does not fit a token count.
    pub fn reconcile(
        &mut self,
        change: &BalanceChange,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<ReconcileOutcome, LedgerError> {
        if self.exemptions.is_exempt(&change.account) {
            return Ok(ReconcileOutcome::default());
        }

        let old_whole = whole_units(change.old, self.unit);
        let new_whole = whole_units(change.new, self.unit);

        if new_whole < old_whole {
            self.reclaim(change.account, to_count(old_whole - new_whole)?, events)
        } else if new_whole > old_whole {
            self.issue(change.account, to_count(new_whole - old_whole)?, events)
        } else {
            Ok(ReconcileOutcome::default())
        }
    }

    /// Moves `count` ids from the top of `account`'s stack into the bank.
    pub(crate) fn reclaim(
        &mut self,
        account: Address,
        count: u64,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<ReconcileOutcome, LedgerError> {
        let mut outcome = ReconcileOutcome::default();
        let owned = self.registry.owned_count(&account) as u64;
        // Accounts that left exemption under the non-retroactive mode may hold
        // balance without ids; they surrender only what they own.
        let count = if count > owned && self.exemptions.was_toggled(&account) {
            owned
        } else {
            count
        };
        for _ in 0..count {
            let id = self.registry.surrender_top(account)?;
            self.bank.enqueue(id);
            events.push(LedgerEvent::TokenTransfer {
                from: account,
                to: Address::ZERO,
                id,
            });
            outcome.reclaimed.push(id);
        }
        Ok(outcome)
    }

    /// Gives `account` `count` ids, bank first, minting once it runs dry.
    pub(crate) fn issue(
        &mut self,
        account: Address,
        count: u64,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<ReconcileOutcome, LedgerError> {
        let mut outcome = ReconcileOutcome::default();
        for _ in 0..count {
            let id = if self.bank.is_empty() {
                let id = self.registry.issue_new(account)?;
                outcome.minted.push(id);
                id
            } else {
                let id = self.bank.dequeue()?;
                self.registry.assign(id, account)?;
                outcome.reissued.push(id);
                id
            };
            events.push(LedgerEvent::TokenTransfer {
                from: Address::ZERO,
                to: account,
                id,
            });
        }
        Ok(outcome)
    }
}

fn to_count(delta: U256) -> Result<u64, LedgerError> {
    if delta > U256::from(u64::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(delta.low_u64())
}
