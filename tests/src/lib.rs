//! # Hybrid Ledger Test Suite
//!
//! Workspace-level tests that drive the ledger through its public surface.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Accounts, configs and permit signing shared by tests and benches
//! └── integration/
//!     ├── scenarios.rs      # Literal ledger walkthroughs
//!     ├── randomized.rs     # Seeded random call sequences against the invariant checker
//!     ├── buckets.rs        # Carton/pack/loosie transfers
//!     ├── permit_flow.rs    # Signed approvals through the async service
//!     ├── event_replay.rs   # Rebuilding state from the committed event log
//!     └── telemetry.rs      # Prometheus output after service calls
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # By area
//! cargo test -p ledger-tests integration::scenarios::
//! cargo test -p ledger-tests integration::randomized::
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

pub mod integration;
