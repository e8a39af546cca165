//! Prometheus metrics for Quorum-Oracle.
//!
//! All metrics follow the naming convention: `qo_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., blocks_produced_total)
//! - **Gauge**: Value that can go up or down (e.g., registry_reporters)
//! - **Histogram**: Distribution of values (e.g., confirmation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ORACLE STATE MACHINE
    // =========================================================================

    /// Rounds finalized, per asset
    pub static ref ROUNDS_FINALIZED: CounterVec = CounterVec::new(
        Opts::new("qo_aggregation_rounds_finalized_total", "Rounds that reached quorum"),
        &["asset"]
    ).expect("metric creation failed");

    /// Contract calls by method and outcome
    pub static ref CONTRACT_CALLS: CounterVec = CounterVec::new(
        Opts::new("qo_contract_calls_total", "Executed oracle calls"),
        &["method", "outcome"]  // outcome: success/reverted
    ).expect("metric creation failed");

    /// Current registry size
    pub static ref REGISTERED_REPORTERS: Gauge = Gauge::new(
        "qo_registry_reporters",
        "Number of registered reporters"
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER HOST
    // =========================================================================

    /// Blocks committed
    pub static ref BLOCKS_PRODUCED: Counter = Counter::new(
        "qo_ledger_blocks_produced_total",
        "Total number of blocks produced"
    ).expect("metric creation failed");

    /// Pending transaction count
    pub static ref PENDING_TRANSACTIONS: Gauge = Gauge::new(
        "qo_ledger_transactions_pending",
        "Transactions waiting for inclusion"
    ).expect("metric creation failed");

    /// Transactions refused at submission
    pub static ref TRANSACTIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("qo_ledger_transactions_rejected_total", "Transactions refused by the ledger"),
        &["reason"]
    ).expect("metric creation failed");

    /// Block production duration
    pub static ref BLOCK_PRODUCTION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qo_ledger_block_production_duration_seconds",
            "Time spent executing and committing a block"
        ).buckets(exponential_buckets(0.00001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // REPORTER AGENTS
    // =========================================================================

    /// Submission attempts by reporter, asset and outcome
    pub static ref REPORTER_SUBMISSIONS: CounterVec = CounterVec::new(
        Opts::new("qo_reporter_submissions_total", "Price submissions by outcome"),
        &["reporter", "asset", "outcome"]  // outcome: confirmed/failed
    ).expect("metric creation failed");

    /// Price source failures
    pub static ref PRICE_FETCH_FAILURES: CounterVec = CounterVec::new(
        Opts::new("qo_reporter_price_fetch_failures_total", "Failed price source queries"),
        &["asset"]
    ).expect("metric creation failed");

    /// Time from send to confirmed receipt
    pub static ref CONFIRMATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "qo_reporter_confirmation_duration_seconds",
            "Time waiting for transaction receipts"
        ).buckets(exponential_buckets(0.05, 2.0, 12).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Handle proving metrics are registered.
#[derive(Clone)]
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Idempotent: collectors that are already registered are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // State machine
        Box::new(ROUNDS_FINALIZED.clone()),
        Box::new(CONTRACT_CALLS.clone()),
        Box::new(REGISTERED_REPORTERS.clone()),
        // Ledger
        Box::new(BLOCKS_PRODUCED.clone()),
        Box::new(PENDING_TRANSACTIONS.clone()),
        Box::new(TRANSACTIONS_REJECTED.clone()),
        Box::new(BLOCK_PRODUCTION_DURATION.clone()),
        // Reporters
        Box::new(REPORTER_SUBMISSIONS.clone()),
        Box::new(PRICE_FETCH_FAILURES.clone()),
        Box::new(CONFIRMATION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format, registering them first if needed.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    register_metrics()?;
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
        $crate::HistogramTimer::new(&$histogram)
    };
}
