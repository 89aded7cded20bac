//! # NCF Telemetry
//!
//! Observability for the NCF sequencing workspace.
//!
//! ## Components
//!
//! - Structured logging via `tracing-subscriber` (plain or JSON lines)
//! - Prometheus metrics for the allocator and configuration-time validation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ncf_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! // Logs and metrics are now being collected
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NCF_SERVICE_NAME` | `ncf-sequencing` | Service name in logs |
//! | `NCF_LOG_LEVEL` | `info` | Log level filter |
//! | `NCF_JSON_LOGS` | `false` | JSON log lines |
//! | `NCF_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `NCF_ENVIRONMENT` | `dev` | Deployment environment |

#![warn(missing_docs)]

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, try_init_test_logging, LoggingGuard};
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, ALLOCATIONS, ALLOCATION_DURATION,
    INTEGRITY_VIOLATIONS, LOCK_CONFLICTS, NUMBERS_AVAILABLE, VALIDATION_REJECTIONS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// The configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first; they do not depend on the subscriber
    let metrics_handle = register_metrics()?;
    let logging_guard = init_logging(&config)?;

    Ok(TelemetryGuard {
        _logging: logging_guard,
        _metrics: metrics_handle,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingGuard,
    _metrics: MetricsHandle,
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
