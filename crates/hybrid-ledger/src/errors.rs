//! # Error Types
//!
//! All error types for the hybrid ledger. Every failure is categorical and
//! aborts the whole call; the ledger never retries internally.

use crate::domain::value_objects::{Address, U256};
use thiserror::Error;

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors raised by ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Debit larger than the available balance.
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: U256, available: U256 },

    /// Delegated spend larger than the remaining allowance.
    #[error("insufficient allowance: required {required}, available {available}")]
    InsufficientAllowance { required: U256, available: U256 },

    /// Caller is neither the holder, the approved address, nor an operator.
    #[error("invalid operator: {caller:?}")]
    InvalidOperator { caller: Address },

    /// Id is outside the valid id space.
    #[error("invalid token id: {0}")]
    InvalidTokenId(U256),

    /// Id is well-formed but unissued or currently banked.
    #[error("token not found: {0}")]
    NotFound(U256),

    /// Batch ids and amounts differ in length.
    #[error("length mismatch: {ids} ids, {amounts} amounts")]
    LengthMismatch { ids: usize, amounts: usize },

    /// Mint would push total supply over the cap.
    #[error("supply exceeded: cap {max}, would reach {would_have}")]
    SupplyExceeded { max: U256, would_have: U256 },

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Dequeue from an empty reclaim queue.
    #[error("reclaim queue is empty")]
    QueueEmpty,

    /// Internal consistency check failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Caller is not the administrator.
    #[error("unauthorized: {caller:?} is not the administrator")]
    Unauthorized { caller: Address },

    /// Recipient is the zero address.
    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    /// Named sender does not hold the token.
    #[error("invalid sender: token held by {owner:?}, not {from:?}")]
    InvalidSender { owner: Address, from: Address },

    /// Spender is the zero address.
    #[error("invalid spender: zero address")]
    InvalidSpender,

    /// Exempt accounts cannot receive discrete tokens.
    #[error("recipient {0:?} is exempt and cannot hold discrete tokens")]
    RecipientExempt(Address),

    /// Permit nonce does not match the owner's current nonce.
    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: U256, got: U256 },
}

impl LedgerError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::InvalidOperator { .. } => "invalid_operator",
            Self::InvalidTokenId(_) => "invalid_token_id",
            Self::NotFound(_) => "not_found",
            Self::LengthMismatch { .. } => "length_mismatch",
            Self::SupplyExceeded { .. } => "supply_exceeded",
            Self::Overflow => "overflow",
            Self::QueueEmpty => "queue_empty",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidRecipient => "invalid_recipient",
            Self::InvalidSender { .. } => "invalid_sender",
            Self::InvalidSpender => "invalid_spender",
            Self::RecipientExempt(_) => "recipient_exempt",
            Self::InvalidNonce { .. } => "invalid_nonce",
        }
    }
}

// =============================================================================
// PERMIT ERRORS
// =============================================================================

/// Errors raised while accepting a signed permit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermitError {
    /// Deadline already passed.
    #[error("permit expired: deadline {deadline}, now {now}")]
    Expired { deadline: u64, now: u64 },

    /// Signature bytes are malformed or unrecoverable.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Recovered signer is not the owner.
    #[error("invalid signer: expected {expected:?}, recovered {recovered:?}")]
    InvalidSigner { expected: Address, recovered: Address },

    /// The ledger rejected the approval.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl PermitError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "permit_expired",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::InvalidSigner { .. } => "invalid_signer",
            Self::Ledger(inner) => inner.category(),
        }
    }
}

/// Errors that carry a stable category label.
pub trait Categorized {
    /// Label used in logs and metrics.
    fn category(&self) -> &'static str;
}

impl Categorized for LedgerError {
    fn category(&self) -> &'static str {
        LedgerError::category(self)
    }
}

impl Categorized for PermitError {
    fn category(&self) -> &'static str {
        PermitError::category(self)
    }
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A field holds an unusable value.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The configuration document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
}
