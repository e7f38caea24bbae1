//! Administrative surface: exemptions and administrator hand-over.

use super::{HybridLedger, LedgerReceipt};
use crate::domain::value_objects::Address;
use crate::errors::LedgerError;
use crate::events::LedgerEvent;
use tracing::info;

impl HybridLedger {
    /// Sets `account`'s exemption flag. Setting the current value is a no-op.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless called by the administrator.
    pub fn set_exempt(
        &mut self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        let receipt = self.transact(|txn| {
            txn.require_admin(caller)?;
            txn.change_exemption(account, exempt)
        })?;
        info!(account = %account, exempt, mode = ?self.settings.mode, "Exemption set by administrator");
        Ok(receipt)
    }

    /// Sets the caller's own exemption flag.
    ///
    /// # Errors
    ///
    /// Only on reconciliation failure in reconcile mode.
    pub fn set_self_exempt(
        &mut self,
        caller: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| txn.change_exemption(caller, exempt))
    }

    /// Hands administration to `new_admin`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless called by the administrator, `InvalidRecipient`
    /// for the zero address.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_admin: Address,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            txn.require_admin(caller)?;
            if new_admin.is_zero() {
                return Err(LedgerError::InvalidRecipient);
            }
            txn.state.admin = new_admin;
            txn.emit(LedgerEvent::OwnershipTransferred {
                previous: caller,
                new: new_admin,
            });
            Ok(())
        })
    }
}
