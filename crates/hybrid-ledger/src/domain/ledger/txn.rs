//! In-flight ledger call.
//!
//! A `Txn` borrows the live state plus the events and discrete movements
//! produced so far. Dropping it without `commit` rolls every component back,
//! including on early return or panic. The shared primitives every operation
//! builds on live here: fungible moves with reconciliation, bucket moves, and
//! exemption changes.

use super::{LedgerReceipt, LedgerState, Settings};
use crate::domain::exemption::ExemptionMode;
use crate::domain::reconciler::{ReconcileOutcome, Reconciler};
use crate::domain::unit_ledger::BalanceChange;
use crate::domain::value_objects::{whole_units, Address, Bucket, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;

pub(crate) struct Txn<'a> {
    pub(crate) state: &'a mut LedgerState,
    pub(crate) settings: Settings,
    pub(crate) events: Vec<LedgerEvent>,
    discrete: ReconcileOutcome,
    /// Administrator when the call began; not journaled by any component.
    admin: Address,
    committed: bool,
}

impl<'a> Txn<'a> {
    pub(crate) fn begin(state: &'a mut LedgerState, settings: Settings) -> Self {
        let admin = state.admin;
        Self {
            state,
            settings,
            events: Vec::new(),
            discrete: ReconcileOutcome::default(),
            admin,
            committed: false,
        }
    }

    pub(crate) fn commit(mut self) -> LedgerReceipt {
        self.state.commit();
        self.committed = true;
        LedgerReceipt {
            events: std::mem::take(&mut self.events),
            discrete: std::mem::take(&mut self.discrete),
        }
    }
}

impl Drop for Txn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.rollback();
            self.state.admin = self.admin;
        }
    }
}

impl Txn<'_> {
    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    fn reconciler(&mut self) -> Reconciler<'_> {
        Reconciler::new(
            &mut self.state.registry,
            &mut self.state.bank,
            &self.state.exemptions,
            self.settings.unit,
        )
    }

    pub(crate) fn reconcile(&mut self, change: &BalanceChange) -> Result<(), LedgerError> {
        self.settle(|reconciler, events| reconciler.reconcile(change, events))
    }

    /// Runs a reconciler step, collecting its events and discrete movements.
    fn settle<F>(&mut self, step: F) -> Result<(), LedgerError>
    where
        F: FnOnce(&mut Reconciler<'_>, &mut Vec<LedgerEvent>) -> Result<ReconcileOutcome, LedgerError>,
    {
        let mut events = std::mem::take(&mut self.events);
        let result = step(&mut self.reconciler(), &mut events);
        self.events = events;
        self.discrete.absorb(result?);
        Ok(())
    }

    // ===== AUTHORIZATION HELPERS =====

    pub(crate) fn require_admin(&self, caller: Address) -> Result<(), LedgerError> {
        if caller == self.state.admin {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller })
        }
    }

    /// Caller is `owner` or one of its operators.
    pub(crate) fn require_owner_or_operator(
        &self,
        caller: Address,
        owner: Address,
    ) -> Result<(), LedgerError> {
        if caller == owner || self.state.authorization.is_operator(&owner, &caller) {
            Ok(())
        } else {
            Err(LedgerError::InvalidOperator { caller })
        }
    }

    // ===== FUNGIBLE PRIMITIVE =====

    /// Moves `amount` from `from` to `to`, sender side reconciled first.
    pub(crate) fn move_units(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        if from == to {
            let available = self.state.units.balance_of(&from);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    required: amount,
                    available,
                });
            }
            self.emit(LedgerEvent::Transfer { from, to, amount });
            return Ok(());
        }

        let debit = self.state.units.debit(from, amount)?;
        let credit = self.state.units.credit(to, amount)?;
        self.emit(LedgerEvent::Transfer { from, to, amount });
        self.reconcile(&debit)?;
        self.reconcile(&credit)
    }

    // ===== BUCKET PRIMITIVE =====

    /// Bucket count `account` holds; exempt accounts hold none.
    pub(crate) fn bucket_balance(&self, account: &Address, bucket: Bucket) -> U256 {
        if self.state.exemptions.is_exempt(account) {
            return U256::zero();
        }
        self.settings
            .sizes
            .decompose(self.state.units.balance_of(account))
            .get(bucket)
    }

    /// Moves `amount` items of `bucket` as their fungible value.
    pub(crate) fn move_bucket(
        &mut self,
        from: Address,
        to: Address,
        bucket: Bucket,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let available = self.bucket_balance(&from, bucket);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                required: amount,
                available,
            });
        }
        let value = self
            .settings
            .sizes
            .size_of(bucket)
            .checked_mul(amount)
            .ok_or(LedgerError::Overflow)?;
        self.move_units(from, to, value)
    }

    // ===== EXEMPTION PRIMITIVE =====

    /// Flips the flag and, in reconcile mode, settles existing holdings.
    pub(crate) fn change_exemption(
        &mut self,
        account: Address,
        exempt: bool,
    ) -> Result<(), LedgerError> {
        if self.state.exemptions.is_exempt(&account) == exempt {
            return Ok(());
        }

        if exempt {
            if self.settings.mode == ExemptionMode::Reconcile {
                let owned = self.state.registry.owned_count(&account) as u64;
                self.settle(|r, events| r.reclaim(account, owned, events))?;
            }
            self.state.exemptions.set(account, true);
        } else {
            self.state.exemptions.set(account, false);
            if self.settings.mode == ExemptionMode::Reconcile {
                let whole = whole_units(self.state.units.balance_of(&account), self.settings.unit);
                let owned = U256::from(self.state.registry.owned_count(&account));
                let missing = whole.saturating_sub(owned);
                if missing > U256::from(u64::MAX) {
                    return Err(LedgerError::Overflow);
                }
                let count = missing.low_u64();
                self.settle(|r, events| r.issue(account, count, events))?;
            }
        }

        self.emit(LedgerEvent::ExemptionChanged { account, exempt });
        Ok(())
    }
}
