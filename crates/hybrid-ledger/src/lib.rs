//! # Hybrid Ledger - Fungible Balances with Discrete Token Identity
//!
//! ## Purpose
//!
//! A single ledger where every account holds a divisible balance and, unless
//! exempt, one discrete token id per whole unit of that balance. Fractional
//! movements that cross a whole-unit boundary surrender or receive ids
//! automatically. Surrendered ids wait in a FIFO reclaim queue and are
//! reissued before any fresh id is minted, so the id space stays bounded by
//! the supply cap.
//!
//! The same balance is also exposed as three bucket denominations (cartons,
//! packs and loosies) that can be transferred individually or in batches.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Non-exempt accounts hold exactly `floor(balance / unit)` ids | `domain/invariants.rs` - `check_unit_invariant()` |
//! | Exempt accounts hold no ids | `domain/invariants.rs` - `check_exempt_invariant()` |
//! | Every minted id is held or banked, never both | `domain/invariants.rs` - `check_conservation_invariant()` |
//! | Reclaim queue entries are unique and banked | `domain/invariants.rs` - `check_bank_invariant()` |
//! | Owned-id stacks agree with the id records | `domain/invariants.rs` - `check_stack_invariant()` |
//! | Balances sum to the total supply | `domain/invariants.rs` - `check_supply_invariant()` |
//!
//! Every mutating call is applied in place and committed only when the whole
//! call succeeds; otherwise each component's undo journal restores it. With
//! `verify_invariants` enabled the checks above run before each commit.
//!
//! ## Reconciliation Order
//!
//! | Direction | Order |
//! |-----------|-------|
//! | Surrender | LIFO from the holder's stack, into the back of the queue |
//! | Receive | FIFO from the front of the queue, then fresh mints |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `EventSink` | Committed event delivery |
//! | `PermitVerifier` | EIP-712 permit signer recovery |
//! | `TimeSource` | Permit deadlines |
//!
//! ## Usage Example
//!
//! ```ignore
//! use hybrid_ledger::prelude::*;
//!
//! let mut ledger = HybridLedger::new(LedgerConfig::with_admin(admin))?;
//! ledger.mint_fungible(admin, alice, U256::exp10(18))?;
//! assert_eq!(ledger.token_balance_of(&alice), 1);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
#[cfg(feature = "metrics")]
mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Value objects
    pub use crate::domain::value_objects::{Address, Bucket, TokenId, ID_PREFIX, U256};

    // Ledger
    pub use crate::domain::buckets::{BucketBalances, BucketConfig, BucketSizes};
    pub use crate::domain::exemption::ExemptionMode;
    pub use crate::domain::ledger::{HybridLedger, LedgerReceipt, LedgerState};
    pub use crate::domain::reconciler::ReconcileOutcome;

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Configuration
    pub use crate::config::{LedgerConfig, PermitDomain};

    // Ports
    pub use crate::ports::inbound::LedgerApi;
    pub use crate::ports::outbound::{
        EventSink, Permit, PermitSignature, PermitVerifier, TimeSource, Timestamp,
    };

    // Events
    pub use crate::events::{topics, EventRecord, LedgerEvent};

    // Errors
    pub use crate::errors::{Categorized, ConfigError, LedgerError, PermitError};

    // Adapters
    pub use crate::adapters::{
        BroadcastEventBus, ControllableTimeSource, Eip712PermitVerifier, InMemoryEventLog,
        SystemTimeSource,
    };

    // Service
    pub use crate::service::{
        create_service_with_config, create_test_service, test_ledger_config, LedgerService,
        ServiceConfig, ServiceStats,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
