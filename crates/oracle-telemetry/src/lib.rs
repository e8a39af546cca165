//! # Oracle Telemetry
//!
//! Logging and metrics for every Quorum-Oracle process.
//!
//! ## Components
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, pretty in
//!   development, JSON in containers
//! - **Metrics**: Prometheus collectors in a process-global registry,
//!   scraped from each reporter's `/metrics` endpoint
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oracle_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QO_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `QO_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `QO_CONSOLE_OUTPUT` | `true` | Print logs at all |
//! | `QO_SERVICE_NAME` | `quorum-oracle` | Name in the startup line |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, BLOCKS_PRODUCED,
    BLOCK_PRODUCTION_DURATION, CONFIRMATION_DURATION, CONTRACT_CALLS, PENDING_TRANSACTIONS,
    PRICE_FETCH_FAILURES, REGISTERED_REPORTERS, REGISTRY, REPORTER_SUBMISSIONS, ROUNDS_FINALIZED,
    TRANSACTIONS_REJECTED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A collector could not be registered or encoded
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first; registration is idempotent
    let metrics_handle = register_metrics()?;

    init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        level = %config.log_level,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
