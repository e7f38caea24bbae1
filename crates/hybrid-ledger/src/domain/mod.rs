//! # Domain Layer (Inner Hexagon)
//!
//! Pure ledger logic. NO I/O, NO async.
//!
//! Components, leaves first:
//!
//! | Component | Module |
//! |-----------|--------|
//! | Unit Ledger | `unit_ledger.rs` |
//! | Discrete Token Registry | `registry.rs` |
//! | Reclaim Queue | `reclaim_queue.rs` |
//! | Exemption Registry | `exemption.rs` |
//! | Authorization Layer | `authorization.rs` |
//! | Transfer Reconciler | `reconciler.rs` |
//! | Bucketed Denominations | `buckets.rs` |
//! | Ledger Aggregate | `ledger/` |

pub mod authorization;
pub mod buckets;
pub mod exemption;
pub mod invariants;
pub mod ledger;
pub mod reclaim_queue;
pub mod reconciler;
pub mod registry;
pub mod unit_ledger;
pub mod value_objects;

pub use authorization::*;
pub use buckets::*;
pub use exemption::*;
pub use invariants::*;
pub use ledger::{HybridLedger, LedgerReceipt, LedgerState};
pub use reclaim_queue::*;
pub use reconciler::*;
pub use registry::*;
pub use unit_ledger::*;
pub use value_objects::*;
