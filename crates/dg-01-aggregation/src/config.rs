//! Metadata aggregator configuration.

use std::env;
use std::time::Duration;

use crate::error::{AggregationError, AggregationResult};

/// Default period between reaper passes.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

/// Settings for `WorkflowMetadataAggregator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataAggregatorConfig {
    /// Distinct nodes that must agree before an observation is released
    pub threshold: usize,
    /// Period of the background reaper
    pub cleanup_interval: Duration,
    /// Age after which a node's observation is dropped
    pub observation_ttl: Duration,
}

impl Default for MetadataAggregatorConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            observation_ttl: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl MetadataAggregatorConfig {
    /// Threshold and interval, with the TTL equal to the interval.
    pub fn new(threshold: usize, cleanup_interval: Duration) -> Self {
        Self {
            threshold,
            cleanup_interval,
            observation_ttl: cleanup_interval,
        }
    }

    /// Load from `DG_AGG_THRESHOLD` and `DG_AGG_CLEANUP_INTERVAL_MS`,
    /// falling back to defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let threshold = env::var("DG_AGG_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.threshold);
        let cleanup_interval = env::var("DG_AGG_CLEANUP_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.cleanup_interval);
        Self::new(threshold, cleanup_interval)
    }

    pub fn validate(&self) -> AggregationResult<()> {
        if self.threshold == 0 {
            return Err(AggregationError::InvalidThreshold(self.threshold));
        }
        if self.cleanup_interval.is_zero() {
            return Err(AggregationError::InvalidConfig(
                "cleanup_interval must be non-zero".to_string(),
            ));
        }
        if self.observation_ttl.is_zero() {
            return Err(AggregationError::InvalidConfig(
                "observation_ttl must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
