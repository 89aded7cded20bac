//! Prometheus metrics for NCF sequencing.
//!
//! All metrics follow the naming convention: `ncf_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., allocations_total)
//! - **Gauge**: Value that can go up or down (e.g., numbers_available)
//! - **Histogram**: Distribution of values (e.g., allocation_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, IntCounter,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ALLOCATOR METRICS
    // =========================================================================

    /// Allocation attempts by prefix and outcome
    pub static ref ALLOCATIONS: CounterVec = CounterVec::new(
        Opts::new("ncf_allocator_allocations_total", "Total identifier allocation attempts"),
        &["prefix", "outcome"]  // outcome: issued/not_active/expired/depleted/lock_conflict/integrity
    ).expect("metric creation failed");

    /// Lock conflicts (row lock busy or CAS lost)
    pub static ref LOCK_CONFLICTS: IntCounter = IntCounter::new(
        "ncf_allocator_lock_conflicts_total",
        "Allocations refused because another writer held or changed the sequence row"
    ).expect("metric creation failed");

    /// Duplicate identifiers found in the issued-document ledger
    pub static ref INTEGRITY_VIOLATIONS: IntCounter = IntCounter::new(
        "ncf_allocator_integrity_violations_total",
        "Identifiers that already existed in the issued-document ledger"
    ).expect("metric creation failed");

    /// Allocation duration histogram
    pub static ref ALLOCATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ncf_allocator_allocation_duration_seconds",
            "Time spent inside next-number allocation"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid buckets"))
    ).expect("metric creation failed");

    // =========================================================================
    // CONFIGURATION METRICS
    // =========================================================================

    /// Range validation rejections by kind
    pub static ref VALIDATION_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("ncf_config_validation_rejections_total", "Sequence ranges rejected at configuration time"),
        &["kind"]  // kind: malformed/capacity/overlap/retroactive/non_ascending
    ).expect("metric creation failed");

    /// Numbers still available per prefix (active sequences)
    pub static ref NUMBERS_AVAILABLE: GaugeVec = GaugeVec::new(
        Opts::new("ncf_sequence_numbers_available", "Numbers left in the active sequence"),
        &["prefix"]
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    _registered: bool,
}

/// Register all metrics with the global registry.
///
/// Registering twice fails with `AlreadyReg`, which is treated as success so
/// the call is idempotent across tests and embedders.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ALLOCATIONS.clone()),
        Box::new(LOCK_CONFLICTS.clone()),
        Box::new(INTEGRITY_VIOLATIONS.clone()),
        Box::new(ALLOCATION_DURATION.clone()),
        Box::new(VALIDATION_REJECTIONS.clone()),
        Box::new(NUMBERS_AVAILABLE.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { _registered: true })
}

/// Render the registry in the Prometheus text exposition format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
