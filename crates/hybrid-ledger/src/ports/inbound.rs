//! # Driving Ports (API - Inbound)
//!
//! The public API of the hybrid ledger. Every mutating call is atomic: it
//! either commits and returns a receipt, or fails and changes nothing.
//!
//! ## Usage
//!
//! ```ignore
//! let receipt = api.transfer(alice, bob, U256::from(1_000u64)).await?;
//! ```

use crate::domain::buckets::BucketSizes;
use crate::domain::ledger::LedgerReceipt;
use crate::domain::value_objects::{Address, TokenId, U256};
use crate::errors::{LedgerError, PermitError};
use crate::ports::outbound::PermitSignature;
use async_trait::async_trait;

// =============================================================================
// LEDGER API (Primary Driving Port)
// =============================================================================

/// Primary API for ledger callers.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    // ===== FUNGIBLE =====

    /// Fungible balance of `account`.
    async fn balance_of(&self, account: Address) -> U256;

    /// Fungible total supply.
    async fn total_supply(&self) -> U256;

    /// Moves `amount` from `caller` to `to`.
    async fn transfer(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Moves `amount` from `from` to `to` against `caller`'s allowance.
    async fn transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Sets `spender`'s allowance over `caller`'s balance.
    async fn approve(
        &self,
        caller: Address,
        spender: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Remaining allowance.
    async fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Administrator-only mint.
    async fn mint(
        &self,
        caller: Address,
        to: Address,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Destroys `amount` of `caller`'s balance.
    async fn burn(&self, caller: Address, amount: U256) -> Result<LedgerReceipt, LedgerError>;

    // ===== DISCRETE =====

    /// Holder of a discrete id.
    async fn owner_of(&self, id: U256) -> Result<Address, LedgerError>;

    /// Ids held by `account`.
    async fn owned_tokens(&self, account: Address) -> Vec<TokenId>;

    /// Number of discrete ids held by `account`.
    async fn token_balance_of(&self, account: Address) -> usize;

    /// Discrete ids ever minted, banked ones included.
    async fn token_total_supply(&self) -> u64;

    /// Moves one of `caller`'s own discrete ids.
    async fn transfer_token(
        &self,
        caller: Address,
        id: U256,
        to: Address,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Moves a specific discrete id.
    async fn transfer_token_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Approves `spender` for one id.
    async fn approve_token(
        &self,
        caller: Address,
        spender: Address,
        id: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Address approved for one id, if any.
    async fn get_approved(&self, id: U256) -> Result<Option<Address>, LedgerError>;

    /// True if `operator` acts for all of `owner`'s assets.
    async fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool;

    /// Grants or revokes a blanket operator.
    async fn set_approval_for_all(
        &self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<LedgerReceipt, LedgerError>;

    // ===== RECLAIM QUEUE =====

    /// Number of banked ids.
    async fn queue_length(&self) -> usize;

    /// Banked id at `index` (0 = next to be reissued).
    async fn queue_peek(&self, index: usize) -> Option<TokenId>;

    /// Banked ids, next-to-reissue first.
    async fn tokens_in_queue(&self) -> Vec<TokenId>;

    // ===== BUCKETS =====

    /// Base-unit size of each bucket.
    async fn bucket_sizes(&self) -> BucketSizes;

    /// Items of `bucket_id` held by `account`.
    async fn bucket_balance_of(&self, account: Address, bucket_id: U256)
        -> Result<U256, LedgerError>;

    /// Moves `amount` items of one bucket.
    async fn safe_transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        bucket_id: U256,
        amount: U256,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Moves several buckets in one call.
    async fn safe_batch_transfer_from(
        &self,
        caller: Address,
        from: Address,
        to: Address,
        ids: Vec<U256>,
        amounts: Vec<U256>,
    ) -> Result<LedgerReceipt, LedgerError>;

    // ===== EXEMPTIONS AND ADMINISTRATION =====

    /// Exemption flag.
    async fn is_exempt(&self, account: Address) -> bool;

    /// Administrator sets an account's exemption.
    async fn set_exempt(
        &self,
        caller: Address,
        account: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Caller sets its own exemption.
    async fn set_self_exempt(
        &self,
        caller: Address,
        exempt: bool,
    ) -> Result<LedgerReceipt, LedgerError>;

    /// Hands administration over.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_admin: Address,
    ) -> Result<LedgerReceipt, LedgerError>;

    // ===== PERMIT =====

    /// Current permit nonce of `owner`.
    async fn nonces(&self, owner: Address) -> U256;

    /// Sets an allowance from an owner-signed permit.
    async fn permit(
        &self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: u64,
        signature: PermitSignature,
    ) -> Result<LedgerReceipt, PermitError>;
}
