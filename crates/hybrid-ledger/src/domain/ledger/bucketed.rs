//! Bucketed surface: carton/pack/loosie balances and transfers.
//!
//! A bucket transfer is a fungible transfer of `size(bucket) * amount`, so
//! discrete ids follow through the normal reconciliation path.

use super::{HybridLedger, LedgerReceipt};
use crate::domain::buckets::BucketSizes;
use crate::domain::value_objects::{Address, Bucket, U256};
use crate::errors::LedgerError;
use crate::events::LedgerEvent;

impl HybridLedger {
    /// Base-unit size of each bucket.
    #[must_use]
    pub fn bucket_sizes(&self) -> BucketSizes {
        self.settings.sizes
    }

    /// Count of `bucket_id` items `account` holds; zero for exempt accounts.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` for ids other than 0, 1 and 2.
    pub fn bucket_balance_of(&self, account: &Address, bucket_id: U256) -> Result<U256, LedgerError> {
        let bucket = Bucket::from_id(bucket_id)?;
        if self.is_exempt(account) {
            return Ok(U256::zero());
        }
        Ok(self
            .settings
            .sizes
            .decompose(self.balance_of(account))
            .get(bucket))
    }

    /// Moves `amount` items of one bucket from `from` to `to`.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId`, `InvalidOperator` unless the caller is `from` or its
    /// operator, `InsufficientBalance` if `from` holds fewer items.
    pub fn safe_transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        bucket_id: U256,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            let bucket = Bucket::from_id(bucket_id)?;
            txn.require_owner_or_operator(caller, from)?;
            txn.move_bucket(from, to, bucket, amount)?;
            txn.emit(LedgerEvent::TransferSingle {
                operator: caller,
                from,
                to,
                id: bucket,
                amount,
            });
            Ok(())
        })
    }

    /// Moves several buckets in order; each pair re-derives `from`'s buckets.
    ///
    /// # Errors
    ///
    /// `LengthMismatch` when `ids` and `amounts` differ in length, then as
    /// [`Self::safe_transfer_from`] for each pair.
    pub fn safe_batch_transfer_from(
        &mut self,
        caller: Address,
        from: Address,
        to: Address,
        ids: &[U256],
        amounts: &[U256],
    ) -> Result<LedgerReceipt, LedgerError> {
        self.transact(|txn| {
            if ids.len() != amounts.len() {
                return Err(LedgerError::LengthMismatch {
                    ids: ids.len(),
                    amounts: amounts.len(),
                });
            }
            txn.require_owner_or_operator(caller, from)?;
            let buckets = ids
                .iter()
                .map(|id| Bucket::from_id(*id))
                .collect::<Result<Vec<_>, _>>()?;

            for (bucket, amount) in buckets.iter().zip(amounts) {
                txn.move_bucket(from, to, *bucket, *amount)?;
            }
            txn.emit(LedgerEvent::TransferBatch {
                operator: caller,
                from,
                to,
                ids: buckets,
                amounts: amounts.to_vec(),
            });
            Ok(())
        })
    }
}
