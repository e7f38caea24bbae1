//! # Event Schema
//!
//! Records emitted by committed ledger calls, in emission order.
//!
//! The zero address stands in as the counterparty for mint, burn, bank
//! deposit and bank withdrawal, so a consumer can rebuild the full ownership
//! map by replaying `TokenTransfer` records alone.

use crate::domain::value_objects::{Address, Bucket, TokenId, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// LEDGER EVENTS
// =============================================================================

/// An observable ledger event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    /// Fungible balance moved (zero address on either side for mint/burn).
    Transfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount in base units.
        amount: U256,
    },
    /// Discrete token moved (zero address for mint and bank movements).
    TokenTransfer {
        /// Previous holder.
        from: Address,
        /// New holder.
        to: Address,
        /// Token id.
        id: TokenId,
    },
    /// Fungible allowance set.
    Approval {
        /// Balance owner.
        owner: Address,
        /// Approved spender.
        spender: Address,
        /// New allowance.
        amount: U256,
    },
    /// Per-token approval set.
    TokenApproval {
        /// Token holder.
        owner: Address,
        /// Approved address.
        approved: Address,
        /// Token id.
        id: TokenId,
    },
    /// Blanket operator approval changed.
    ApprovalForAll {
        /// Asset owner.
        owner: Address,
        /// Operator.
        operator: Address,
        /// Whether the operator is approved.
        approved: bool,
    },
    /// Exemption flag changed.
    ExemptionChanged {
        /// Affected account.
        account: Address,
        /// New flag.
        exempt: bool,
    },
    /// Single bucketed transfer.
    TransferSingle {
        /// Caller.
        operator: Address,
        /// Sender.
        from: Address,
        /// Recipient.
        to: Address,
        /// Bucket moved.
        id: Bucket,
        /// Number of bucket items moved.
        amount: U256,
    },
    /// Batch bucketed transfer.
    TransferBatch {
        /// Caller.
        operator: Address,
        /// Sender.
        from: Address,
        /// Recipient.
        to: Address,
        /// Buckets moved.
        ids: Vec<Bucket>,
        /// Item counts, parallel to `ids`.
        amounts: Vec<U256>,
    },
    /// Administrator changed.
    OwnershipTransferred {
        /// Previous administrator.
        previous: Address,
        /// New administrator.
        new: Address,
    },
}

impl LedgerEvent {
    /// Topic string for routing.
    #[must_use]
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => topics::TRANSFER,
            Self::TokenTransfer { .. } => topics::TOKEN_TRANSFER,
            Self::Approval { .. } => topics::APPROVAL,
            Self::TokenApproval { .. } => topics::TOKEN_APPROVAL,
            Self::ApprovalForAll { .. } => topics::APPROVAL_FOR_ALL,
            Self::ExemptionChanged { .. } => topics::EXEMPTION_CHANGED,
            Self::TransferSingle { .. } => topics::TRANSFER_SINGLE,
            Self::TransferBatch { .. } => topics::TRANSFER_BATCH,
            Self::OwnershipTransferred { .. } => topics::OWNERSHIP_TRANSFERRED,
        }
    }
}

/// Event record with its position in the committed event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position across all committed calls.
    pub sequence: u64,
    /// The event.
    pub event: LedgerEvent,
}

// =============================================================================
// TOPICS
// =============================================================================

/// Event topics.
pub mod topics {
    /// Fungible transfer.
    pub const TRANSFER: &str = "ledger.transfer";
    /// Discrete transfer.
    pub const TOKEN_TRANSFER: &str = "ledger.token_transfer";
    /// Fungible approval.
    pub const APPROVAL: &str = "ledger.approval";
    /// Token approval.
    pub const TOKEN_APPROVAL: &str = "ledger.token_approval";
    /// Operator approval.
    pub const APPROVAL_FOR_ALL: &str = "ledger.approval_for_all";
    /// Exemption change.
    pub const EXEMPTION_CHANGED: &str = "ledger.exemption_changed";
    /// Single bucketed transfer.
    pub const TRANSFER_SINGLE: &str = "ledger.transfer_single";
    /// Batch bucketed transfer.
    pub const TRANSFER_BATCH: &str = "ledger.transfer_batch";
    /// Administrator change.
    pub const OWNERSHIP_TRANSFERRED: &str = "ledger.ownership_transferred";
}
