//! Prometheus metrics for the hybrid ledger.
//!
//! All metrics follow the naming convention: `ledger_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., tokens_minted_total)
//! - **Gauge**: Value that can go up or down (e.g., reclaim_queue_depth)
//! - **Histogram**: Distribution of values (e.g., call_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts,
    HistogramVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CALL METRICS
    // =========================================================================

    /// Ledger calls by operation and outcome
    pub static ref LEDGER_CALLS: CounterVec = CounterVec::new(
        Opts::new("ledger_calls_total", "Ledger calls by operation and outcome"),
        &["operation", "outcome"]  // outcome: committed/rejected
    ).expect("metric creation failed");

    /// Rejected calls by error category
    pub static ref LEDGER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ledger_errors_total", "Rejected calls by error category"),
        &["category"]
    ).expect("metric creation failed");

    /// Call duration including event publication
    pub static ref CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "ledger_call_duration_seconds",
            "Time spent executing a ledger call"
        ).buckets(exponential_buckets(0.000_01, 2.0, 15).unwrap()),
        &["operation"]
    ).expect("metric creation failed");

    /// Invariant audit duration
    pub static ref AUDIT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ledger_audit_duration_seconds",
            "Time spent running the invariant checker"
        ).buckets(exponential_buckets(0.000_1, 2.0, 12).unwrap())
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT METRICS
    // =========================================================================

    /// Events emitted by committed calls
    pub static ref EVENTS_EMITTED: CounterVec = CounterVec::new(
        Opts::new("ledger_events_emitted_total", "Events emitted by committed calls"),
        &["topic"]
    ).expect("metric creation failed");

    // =========================================================================
    // DISCRETE TOKEN METRICS
    // =========================================================================

    /// Fresh ids minted
    pub static ref TOKENS_MINTED: Counter = Counter::new(
        "ledger_tokens_minted_total",
        "Total discrete ids minted for the first time"
    ).expect("metric creation failed");

    /// Ids moved into the reclaim queue
    pub static ref TOKENS_RECLAIMED: Counter = Counter::new(
        "ledger_tokens_reclaimed_total",
        "Total discrete ids surrendered to the reclaim queue"
    ).expect("metric creation failed");

    /// Ids reissued from the reclaim queue
    pub static ref TOKENS_REISSUED: Counter = Counter::new(
        "ledger_tokens_reissued_total",
        "Total discrete ids reissued from the reclaim queue"
    ).expect("metric creation failed");

    /// Current reclaim queue depth
    pub static ref RECLAIM_QUEUE_DEPTH: Gauge = Gauge::new(
        "ledger_reclaim_queue_depth",
        "Number of discrete ids waiting in the reclaim queue"
    ).expect("metric creation failed");

    // =========================================================================
    // PERMIT METRICS
    // =========================================================================

    /// Permit submissions by result
    pub static ref PERMITS: CounterVec = CounterVec::new(
        Opts::new("ledger_permits_total", "Permit submissions"),
        &["result"]  // result: accepted/rejected
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Calls
        Box::new(LEDGER_CALLS.clone()),
        Box::new(LEDGER_ERRORS.clone()),
        Box::new(CALL_DURATION.clone()),
        Box::new(AUDIT_DURATION.clone()),
        // Events
        Box::new(EVENTS_EMITTED.clone()),
        // Discrete tokens
        Box::new(TOKENS_MINTED.clone()),
        Box::new(TOKENS_RECLAIMED.clone()),
        Box::new(TOKENS_REISSUED.clone()),
        Box::new(RECLAIM_QUEUE_DEPTH.clone()),
        // Permits
        Box::new(PERMITS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
