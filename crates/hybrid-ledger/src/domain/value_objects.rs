//! # Value Objects
//!
//! Immutable primitives shared by every ledger component: account addresses,
//! 256-bit amounts, discrete token identifiers and bucket identifiers.

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for 256-bit arithmetic
pub use primitive_types::U256;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
///
/// The zero address is the neutral identity used as the counterparty of
/// mint, burn and bank movements in emitted events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address with every byte set to `byte`.
    #[must_use]
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() == 20 {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(slice);
            Some(Self(bytes))
        } else {
            None
        }
    }

    /// Parses a hex string, with or without a `0x` prefix.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(stripped)
            .ok()
            .and_then(|bytes| Self::from_slice(&bytes))
    }

    /// Full lowercase hex form with `0x` prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// TOKEN ID
// =============================================================================

/// Offset added to every discrete token sequence number (2^255).
///
/// Ids at or below the prefix are never discrete tokens, which keeps the
/// discrete id space disjoint from fungible amounts and bucket ids.
pub const ID_PREFIX: U256 = U256([0, 0, 0, 0x8000_0000_0000_0000]);

/// Identifier of a discrete token: `ID_PREFIX + sequence`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(U256);

impl TokenId {
    /// Builds the id for the given 1-based sequence number.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(ID_PREFIX + U256::from(sequence))
    }

    /// Validates a raw id against the discrete id space.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` if `raw <= ID_PREFIX` or `raw == U256::MAX`.
    pub fn parse(raw: U256) -> Result<Self, LedgerError> {
        if raw <= ID_PREFIX || raw == U256::MAX {
            return Err(LedgerError::InvalidTokenId(raw));
        }
        Ok(Self(raw))
    }

    /// Sequence number, or None when it exceeds anything ever mintable.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        let offset = self.0 - ID_PREFIX;
        if offset > U256::from(u64::MAX) {
            None
        } else {
            Some(offset.low_u64())
        }
    }

    /// Raw 256-bit value.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sequence() {
            Some(seq) => write!(f, "TokenId(PREFIX+{seq})"),
            None => write!(f, "TokenId({})", self.0),
        }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TokenId> for U256 {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

/// Whole units represented by `balance`.
///
/// This is the only place the discrete count is derived from; it is never
/// stored alongside the balance.
#[must_use]
pub fn whole_units(balance: U256, unit: U256) -> U256 {
    balance / unit
}

// =============================================================================
// BUCKET
// =============================================================================

/// Denomination bucket of the multi-token view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bucket {
    /// Largest denomination (id 0).
    Cartons = 0,
    /// Middle denomination (id 1).
    Packs = 1,
    /// Smallest denomination (id 2).
    Loosies = 2,
}

impl Bucket {
    /// All buckets, largest first.
    pub const ALL: [Self; 3] = [Self::Cartons, Self::Packs, Self::Loosies];

    /// Resolves a raw bucket id.
    ///
    /// # Errors
    ///
    /// `InvalidTokenId` for anything other than 0, 1 or 2.
    pub fn from_id(raw: U256) -> Result<Self, LedgerError> {
        if raw > U256::from(2u8) {
            return Err(LedgerError::InvalidTokenId(raw));
        }
        match raw.low_u64() {
            0 => Ok(Self::Cartons),
            1 => Ok(Self::Packs),
            _ => Ok(Self::Loosies),
        }
    }

    /// Numeric id of this bucket.
    #[must_use]
    pub fn id(self) -> U256 {
        U256::from(self as u8)
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cartons => "cartons",
            Self::Packs => "packs",
            Self::Loosies => "loosies",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
