//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the ledger service depends on:
//! - Event delivery (`EventSink`)
//! - Permit signature verification (`PermitVerifier`)
//! - Wall clock for permit deadlines (`TimeSource`)

use crate::domain::value_objects::{Address, U256};
use crate::errors::PermitError;
use crate::events::EventRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receives committed events in commit order.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publishes one call's events. Returns the number of receivers reached.
    async fn publish(&self, records: &[EventRecord]) -> usize;

    /// Total records accepted so far.
    fn events_published(&self) -> u64;
}

// =============================================================================
// PERMIT VERIFICATION
// =============================================================================

/// Off-ledger approval signed by the owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    /// Balance owner and expected signer.
    pub owner: Address,
    /// Spender being approved.
    pub spender: Address,
    /// Allowance to set.
    pub value: U256,
    /// Owner's nonce at signing time.
    pub nonce: U256,
    /// Unix timestamp after which the permit is void.
    pub deadline: u64,
}

/// secp256k1 signature in `(v, r, s)` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitSignature {
    /// Recovery id (0 or 1, or 27/28 in legacy format).
    pub v: u8,
    /// r component.
    pub r: [u8; 32],
    /// s component.
    pub s: [u8; 32],
}

impl PermitSignature {
    /// Creates a new signature.
    #[must_use]
    pub const fn new(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        Self { v, r, s }
    }
}

/// Recovers the signer of a permit.
pub trait PermitVerifier: Send + Sync {
    /// Address that produced `signature` over `permit`.
    ///
    /// # Errors
    ///
    /// `InvalidSignature` if the signature is malformed or unrecoverable.
    fn recover_signer(
        &self,
        permit: &Permit,
        signature: &PermitSignature,
    ) -> Result<Address, PermitError>;
}

// =============================================================================
// TIME SOURCE
// =============================================================================

/// Unix time in seconds.
pub type Timestamp = u64;

/// Abstract time source for testability.
pub trait TimeSource: Send + Sync {
    /// Current Unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}
