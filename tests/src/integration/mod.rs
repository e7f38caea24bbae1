//! Cross-module flows over the ledger, its adapters and the async service.

pub mod buckets;
pub mod event_replay;
pub mod permit_flow;
pub mod randomized;
pub mod scenarios;
pub mod telemetry;
