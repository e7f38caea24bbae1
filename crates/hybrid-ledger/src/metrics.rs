//! Prometheus recording for ledger calls (enabled by the `metrics` feature).

use crate::domain::ledger::LedgerReceipt;
use ledger_telemetry::metrics::HistogramTimer;
use ledger_telemetry::{
    metric_inc, metric_observe, time_histogram, AUDIT_DURATION, CALL_DURATION, EVENTS_EMITTED, LEDGER_CALLS,
    LEDGER_ERRORS, PERMITS, RECLAIM_QUEUE_DEPTH, TOKENS_MINTED, TOKENS_RECLAIMED,
    TOKENS_REISSUED,
};

/// Records a committed call.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn record_commit(
    operation: &str,
    receipt: &LedgerReceipt,
    queue_depth: usize,
    elapsed_secs: f64,
) {
    metric_inc!(LEDGER_CALLS, &[operation, "committed"]);
    metric_observe!(CALL_DURATION, &[operation], elapsed_secs);
    for event in &receipt.events {
        metric_inc!(EVENTS_EMITTED, &[event.topic()]);
    }
    TOKENS_MINTED.inc_by(receipt.discrete.minted.len() as f64);
    TOKENS_RECLAIMED.inc_by(receipt.discrete.reclaimed.len() as f64);
    TOKENS_REISSUED.inc_by(receipt.discrete.reissued.len() as f64);
    RECLAIM_QUEUE_DEPTH.set(queue_depth as f64);
}

/// Records a rejected call.
pub(crate) fn record_rejection(operation: &str, category: &str, elapsed_secs: f64) {
    metric_inc!(LEDGER_CALLS, &[operation, "rejected"]);
    metric_inc!(LEDGER_ERRORS, &[category]);
    metric_observe!(CALL_DURATION, &[operation], elapsed_secs);
}

/// Records a permit submission.
pub(crate) fn record_permit(accepted: bool) {
    let result = if accepted { "accepted" } else { "rejected" };
    metric_inc!(PERMITS, &[result]);
}

/// Times an invariant audit until dropped.
pub(crate) fn audit_timer() -> HistogramTimer {
    time_histogram!(AUDIT_DURATION)
}
