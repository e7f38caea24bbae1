//! # Authorization Layer
//!
//! Fungible allowances, blanket operator approvals and permit nonces.
//! Per-token approvals live on the registry record so that they are
//! cleared together with every ownership change.

use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Copy, Debug)]
enum AuthUndo {
    Allowance(Address, Address, U256),
    Operator(Address, Address, bool),
    Nonce(Address, U256),
}

/// Allowance, operator and nonce tables.
#[derive(Clone, Debug, Default)]
pub struct Authorization {
    allowances: HashMap<(Address, Address), U256>,
    operators: HashSet<(Address, Address)>,
    nonces: HashMap<Address, U256>,
    journal: Vec<AuthUndo>,
}

impl Authorization {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining allowance of `spender` over `owner`'s balance.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// True if `operator` may act on all of `owner`'s assets.
    #[must_use]
    pub fn is_operator(&self, owner: &Address, operator: &Address) -> bool {
        self.operators.contains(&(*owner, *operator))
    }

    /// Current permit nonce of `owner`.
    #[must_use]
    pub fn nonce(&self, owner: &Address) -> U256 {
        self.nonces.get(owner).copied().unwrap_or_default()
    }

    /// Overwrites the allowance.
    pub(crate) fn set_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        let previous = self.allowance(&owner, &spender);
        self.journal
            .push(AuthUndo::Allowance(owner, spender, previous));
        self.put_allowance(owner, spender, amount);
    }

    fn put_allowance(&mut self, owner: Address, spender: Address, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), amount);
        }
    }

    /// Checks and consumes `amount` of allowance. `U256::MAX` is never decremented.
    pub(crate) fn spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let current = self.allowance(&owner, &spender);
        if current == U256::MAX {
            return Ok(());
        }
        let remaining = current
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                required: amount,
                available: current,
            })?;
        self.set_allowance(owner, spender, remaining);
        Ok(())
    }

    pub(crate) fn set_operator(&mut self, owner: Address, operator: Address, approved: bool) {
        let previous = self.is_operator(&owner, &operator);
        self.journal
            .push(AuthUndo::Operator(owner, operator, previous));
        self.put_operator(owner, operator, approved);
    }

    fn put_operator(&mut self, owner: Address, operator: Address, approved: bool) {
        if approved {
            self.operators.insert((owner, operator));
        } else {
            self.operators.remove(&(owner, operator));
        }
    }

    /// Consumes `nonce` if it equals the owner's current nonce.
    pub(crate) fn consume_nonce(&mut self, owner: Address, nonce: U256) -> Result<(), LedgerError> {
        let expected = self.nonce(&owner);
        if nonce != expected {
            return Err(LedgerError::InvalidNonce {
                expected,
                got: nonce,
            });
        }
        let next = expected.checked_add(U256::one()).ok_or(LedgerError::Overflow)?;
        self.journal.push(AuthUndo::Nonce(owner, expected));
        self.nonces.insert(owner, next);
        Ok(())
    }

    pub(crate) fn commit(&mut self) {
        self.journal.clear();
    }

    pub(crate) fn rollback(&mut self) {
        while let Some(undo) = self.journal.pop() {
            match undo {
                AuthUndo::Allowance(owner, spender, amount) => {
                    self.put_allowance(owner, spender, amount);
                }
                AuthUndo::Operator(owner, operator, approved) => {
                    self.put_operator(owner, operator, approved);
                }
                AuthUndo::Nonce(owner, nonce) if nonce.is_zero() => {
                    self.nonces.remove(&owner);
                }
                AuthUndo::Nonce(owner, nonce) => {
                    self.nonces.insert(owner, nonce);
                }
            }
        }
    }
}
