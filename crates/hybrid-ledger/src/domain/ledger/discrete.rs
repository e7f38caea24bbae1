//! Discrete surface: per-token transfers and approvals.
//!
//! Moving a specific id carries exactly one unit of fungible balance with it
//! and bypasses the reconciler; both sides stay consistent because each
//! gains or loses exactly one whole unit and one id.

use super::{HybridLedger, LedgerReceipt};
use crate::domain::value_objects::{Address, TokenId, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;

impl HybridLedger {
    /// Transfers the caller's own token `id` to `to`.
    ///
    /// # Errors
    ///
    /// As [`Self::transfer_token_from`] with `from = caller`.
    pub fn transfer_token(
        &mut self,
        caller: Address,
        id: U256,
        to: Address,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transfer_token_from(caller, caller, to, id)
    }

    /// Transfers token `id` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - `InvalidTokenId` / `NotFound` for ids outside the id space or not owned
    /// - `InvalidSender` if `from` does not hold the id
    /// - `InvalidRecipient` for the zero address
    /// - `InvalidOperator` unless the caller is the holder, approved, or an operator
    /// - `RecipientExempt` if `to` cannot hold discrete tokens
    pub fn transfer_token_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            let token = TokenId::parse(id)?;
            let owner = txn.state.registry.owner_of(id)?;
            if from != owner {
                return Err(LedgerError::InvalidSender { owner, from });
            }
            if to.is_zero() {
                return Err(LedgerError::InvalidRecipient);
            }
            let approved = txn.state.registry.get_approved(id)?;
            if caller != from
                && approved != Some(caller)
                && !txn.state.authorization.is_operator(&from, &caller)
            {
                return Err(LedgerError::InvalidOperator { caller });
            }
            if txn.state.exemptions.is_exempt(&to) {
                return Err(LedgerError::RecipientExempt(to));
            }

            let unit = txn.settings.unit;
            txn.state.units.debit(from, unit)?;
            txn.state.units.credit(to, unit)?;
            txn.state.registry.transfer_specific(token, from, to)?;

            txn.emit(LedgerEvent::Transfer {
                from,
                to,
                amount: unit,
            });
            txn.emit(LedgerEvent::TokenTransfer { from, to, id: token });
            Ok(())
        })
    }

    /// Approves `spender` for token `id`; the zero address clears it.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` / `NotFound`, or `InvalidOperator` unless the caller
    /// holds the id or operates for its holder.
    pub fn approve_token(
        &mut self,
        caller: Address,
        spender: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            let token = TokenId::parse(id)?;
            let owner = txn.state.registry.owner_of(id)?;
            txn.require_owner_or_operator(caller, owner)?;

            let approved = (!spender.is_zero()).then_some(spender);
            txn.state.registry.set_approved(token, approved)?;
            txn.emit(LedgerEvent::TokenApproval {
                owner,
                approved: spender,
                id: token,
            });
            Ok(())
        })
    }

    /// Grants or revokes `operator` over all of `caller`'s assets.
    ///
    /// # Errors
    ///
    /// `InvalidSpender` for the zero address.
    pub fn set_approval_for_all(
        &mut self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            if operator.is_zero() {
                return Err(LedgerError::InvalidSpender);
            }
            txn.state
                .authorization
                .set_operator(caller, operator, approved);
            txn.emit(LedgerEvent::ApprovalForAll {
                owner: caller,
                operator,
                approved,
            });
            Ok(())
        })
    }
}
