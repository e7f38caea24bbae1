//! Fungible surface: mint, transfer, delegated transfer, allowances, burn.

use super::{HybridLedger, LedgerReceipt};
use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;

impl HybridLedger {
    /// Mints fungible balance to `to`; discrete ids follow via reconciliation.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless called by the administrator, `InvalidRecipient`
    /// for the zero address, `SupplyExceeded` past the cap.
    pub fn mint_fungible(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            txn.require_admin(caller)?;
            if to.is_zero() {
                return Err(LedgerError::InvalidRecipient);
            }
            let max = txn.settings.max_supply;
            let would_have = txn
                .state
                .units
                .total_supply()
                .checked_add(amount)
                .ok_or(LedgerError::Overflow)?;
            if would_have > max {
                return Err(LedgerError::SupplyExceeded { max, would_have });
            }

            let change = txn.state.units.mint(to, amount)?;
            txn.emit(LedgerEvent::Transfer {
                from: Address::ZERO,
                to,
                amount,
            });
            txn.reconcile(&change)
        })
    }

    /// Moves `amount` from `caller` to `to`.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance`, `InvalidRecipient`.
    pub fn transfer(
        &mut self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| txn.move_units(caller, to, amount))
    }

    /// Moves `amount` from `from` to `to` against `caller`'s allowance.
    ///
    /// # Errors
    ///
    /// `InsufficientAllowance` before any balance is touched, then as
    /// [`Self::transfer`].
    pub fn transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            txn.state
                .authorization
                .spend_allowance(from, caller, amount)?;
            txn.move_units(from, to, amount)
        })
    }

    /// Sets `spender`'s allowance over `owner`'s balance, overwriting.
    ///
    /// # Errors
    ///
    /// `InvalidSpender` for the zero address.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            if spender.is_zero() {
                return Err(LedgerError::InvalidSpender);
            }
            txn.state
                .authorization
                .set_allowance(owner, spender, amount);
            txn.emit(LedgerEvent::Approval {
                owner,
                spender,
                amount,
            });
            Ok(())
        })
    }

    /// Approval authorized by a verified permit: consumes `nonce` and sets
    /// the allowance.
    ///
    /// # Errors
    ///
    /// `InvalidNonce` unless `nonce` equals the owner's current nonce,
    /// `InvalidSpender` for the zero address.
    pub fn approve_on_behalf(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
        nonce: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            if spender.is_zero() {
                return Err(LedgerError::InvalidSpender);
            }
            txn.state.authorization.consume_nonce(owner, nonce)?;
            txn.state
                .authorization
                .set_allowance(owner, spender, amount);
            txn.emit(LedgerEvent::Approval {
                owner,
                spender,
                amount,
            });
            Ok(())
        })
    }

    /// Destroys `amount` of `caller`'s balance; surrendered ids are banked.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance`.
    pub fn burn(&mut self, caller: Address, amount: U256) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            let change = txn.state.units.burn(caller, amount)?;
            txn.emit(LedgerEvent::Transfer {
                from: caller,
                to: Address::ZERO,
                amount,
            });
            txn.reconcile(&change)
        })
    }
}
