//! # Aggregation Metrics
//!
//! Thin shims over the collectors in `dg-telemetry`. With the `metrics`
//! feature disabled every function compiles to a no-op.
//!
//! ## Metrics Written
//!
//! - `dg_aggregation_observations_expired_total` - observations evicted by the reaper
//! - `dg_aggregation_observation_groups` - digest groups left after a reap

/// Record observations evicted by one reaper pass
#[cfg(feature = "metrics")]
pub fn record_observations_expired(count: usize) {
    dg_telemetry::AGGREGATION_OBSERVATIONS_EXPIRED.inc_by(count as u64);
}

/// Update the number of tracked digest groups
#[cfg(feature = "metrics")]
pub fn set_observation_groups(count: usize) {
    dg_telemetry::AGGREGATION_GROUPS.set(count as i64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_observations_expired(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn set_observation_groups(_count: usize) {}
