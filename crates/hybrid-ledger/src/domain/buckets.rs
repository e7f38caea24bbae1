//! # Bucketed Denominations
//!
//! Carton/pack/loosie view over the fungible balance. Bucket balances are
//! not stored; they are a greedy decomposition of the current balance.

use crate::domain::value_objects::{Bucket, U256};
use serde::{Deserialize, Serialize};

/// Divisors deriving bucket sizes from the unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// `carton = unit / carton_divisor`.
    pub carton_divisor: u64,
    /// `pack = carton / pack_divisor`.
    pub pack_divisor: u64,
    /// `loosie = pack / loosie_divisor`.
    pub loosie_divisor: u64,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            carton_divisor: 5,
            pack_divisor: 10,
            loosie_divisor: 20,
        }
    }
}

/// Base-unit size of each bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BucketSizes {
    /// Size of one carton.
    pub carton: U256,
    /// Size of one pack.
    pub pack: U256,
    /// Size of one loosie.
    pub loosie: U256,
}

impl BucketSizes {
    /// Derives sizes from the unit. Sizes may be zero if the divisors are
    /// too coarse for the unit; configuration validation rejects that.
    #[must_use]
    pub fn derive(unit: U256, config: &BucketConfig) -> Self {
        let carton = unit / U256::from(config.carton_divisor.max(1));
        let pack = carton / U256::from(config.pack_divisor.max(1));
        let loosie = pack / U256::from(config.loosie_divisor.max(1));
        Self {
            carton,
            pack,
            loosie,
        }
    }

    /// True if every size is non-zero.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.carton.is_zero() && !self.pack.is_zero() && !self.loosie.is_zero()
    }

    /// Size of `bucket`.
    #[must_use]
    pub fn size_of(&self, bucket: Bucket) -> U256 {
        match bucket {
            Bucket::Cartons => self.carton,
            Bucket::Packs => self.pack,
            Bucket::Loosies => self.loosie,
        }
    }

    /// Greedy decomposition of `balance`.
    #[must_use]
    pub fn decompose(&self, balance: U256) -> BucketBalances {
        if !self.is_usable() {
            return BucketBalances::default();
        }
        BucketBalances {
            cartons: balance / self.carton,
            packs: (balance % self.carton) / self.pack,
            loosies: (balance % self.pack) / self.loosie,
        }
    }
}

/// Per-bucket counts for one account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketBalances {
    /// Whole cartons.
    pub cartons: U256,
    /// Packs left after cartons.
    pub packs: U256,
    /// Loosies left after packs.
    pub loosies: U256,
}

impl BucketBalances {
    /// Count for `bucket`.
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> U256 {
        match bucket {
            Bucket::Cartons => self.cartons,
            Bucket::Packs => self.packs,
            Bucket::Loosies => self.loosies,
        }
    }
}
