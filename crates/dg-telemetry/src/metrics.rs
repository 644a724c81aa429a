//! Prometheus metrics for the DON gateway subsystems.
//!
//! All metrics follow the naming convention: `dg_<subsystem>_<metric>_<unit>`
//!
//! Writes are fire-and-forget: nothing on a control path reads these values.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry,
    TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // AGGREGATION METRICS (Subsystem 1)
    // =========================================================================

    /// Observations evicted by the metadata aggregator's reaper
    pub static ref AGGREGATION_OBSERVATIONS_EXPIRED: IntCounter = IntCounter::new(
        "dg_aggregation_observations_expired_total",
        "Total number of expired node observations removed by the reaper"
    ).expect("metric creation failed");

    /// Observation groups still tracked after the last reap
    pub static ref AGGREGATION_GROUPS: IntGauge = IntGauge::new(
        "dg_aggregation_observation_groups",
        "Number of distinct observation digests currently tracked"
    ).expect("metric creation failed");

    // =========================================================================
    // REGISTRY SYNC METRICS (Subsystem 2)
    // =========================================================================

    /// Periodic syncs that failed
    pub static ref REGISTRY_REMOTE_SYNC_FAILURES: IntCounter = IntCounter::new(
        "dg_registry_remote_sync_failures_total",
        "Total number of failed periodic syncs with the remote registry"
    ).expect("metric creation failed");

    /// Listener notifications that returned an error
    pub static ref REGISTRY_LISTENER_FAILURES: IntCounter = IntCounter::new(
        "dg_registry_listener_failures_total",
        "Total number of registry listener notifications that failed"
    ).expect("metric creation failed");

    /// Snapshot rows actually inserted by the registry store
    pub static ref REGISTRY_STATES_PERSISTED: IntCounter = IntCounter::new(
        "dg_registry_states_persisted_total",
        "Total number of distinct registry snapshots persisted"
    ).expect("metric creation failed");

    /// Duration of a full sync pass
    pub static ref REGISTRY_SYNC_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "dg_registry_sync_duration_seconds",
            "Time spent importing the registry and notifying listeners"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Aggregation
        Box::new(AGGREGATION_OBSERVATIONS_EXPIRED.clone()),
        Box::new(AGGREGATION_GROUPS.clone()),
        // Registry sync
        Box::new(REGISTRY_REMOTE_SYNC_FAILURES.clone()),
        Box::new(REGISTRY_LISTENER_FAILURES.clone()),
        Box::new(REGISTRY_STATES_PERSISTED.clone()),
        Box::new(REGISTRY_SYNC_DURATION.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
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
        self.histogram.observe(self.start.elapsed().as_secs_f64());
    }
}
