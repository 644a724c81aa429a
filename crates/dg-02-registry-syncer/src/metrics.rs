//! # Registry Syncer Metrics
//!
//! Shims over the `dg-telemetry` collectors; no-ops without the `metrics`
//! feature.
//!
//! ## Metrics Written
//!
//! - `dg_registry_remote_sync_failures_total` - periodic syncs that failed
//! - `dg_registry_listener_failures_total` - listener callbacks that returned an error
//! - `dg_registry_states_persisted_total` - snapshot rows inserted by the store
//! - `dg_registry_sync_duration_seconds` - wall time of one sync

#[cfg(feature = "metrics")]
pub fn record_remote_sync_failure() {
    dg_telemetry::REGISTRY_REMOTE_SYNC_FAILURES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_listener_failure() {
    dg_telemetry::REGISTRY_LISTENER_FAILURES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_state_persisted() {
    dg_telemetry::REGISTRY_STATES_PERSISTED.inc();
}

/// Timer that records the sync duration when dropped
#[cfg(feature = "metrics")]
pub fn start_sync_timer() -> dg_telemetry::HistogramTimer {
    dg_telemetry::HistogramTimer::new(&dg_telemetry::REGISTRY_SYNC_DURATION)
}

#[cfg(not(feature = "metrics"))]
pub fn record_remote_sync_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_listener_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_state_persisted() {}

#[cfg(not(feature = "metrics"))]
pub fn start_sync_timer() {}
