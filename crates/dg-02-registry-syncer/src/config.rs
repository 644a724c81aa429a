//! Registry synchronizer configuration.

use std::env;
use std::time::Duration;

use crate::domain::BoundContract;
use crate::error::{SyncError, SyncResult};

/// Name of the registry contract the chain reader binds to.
pub const CAPABILITIES_REGISTRY_CONTRACT: &str = "CapabilitiesRegistry";

/// Default period between periodic syncs.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(12);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncerConfig {
    /// Address of the registry contract
    pub registry_address: String,
    /// Contract name used when binding the reader
    pub contract_name: String,
    /// Period of the sync loop
    pub tick_interval: Duration,
    /// Capacity of the hand-off queue to the persistence loop
    pub update_queue_capacity: usize,
}

impl Default for SyncerConfig {
    fn default() -> Self {
        Self {
            registry_address: String::new(),
            contract_name: CAPABILITIES_REGISTRY_CONTRACT.to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            update_queue_capacity: 1,
        }
    }
}

impl SyncerConfig {
    pub fn new(registry_address: impl Into<String>) -> Self {
        Self {
            registry_address: registry_address.into(),
            ..Self::default()
        }
    }

    /// Load from `DG_REGISTRY_ADDRESS` and `DG_SYNC_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            registry_address: env::var("DG_REGISTRY_ADDRESS").unwrap_or(defaults.registry_address),
            tick_interval: env::var("DG_SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.tick_interval),
            ..defaults
        }
    }

    /// Reject settings the sync loop cannot run with.
    pub fn validate(&self) -> SyncResult<()> {
        if self.tick_interval.is_zero() {
            return Err(SyncError::InvalidConfig(
                "tick_interval must be non-zero".to_string(),
            ));
        }
        if self.update_queue_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "update_queue_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Contract descriptor handed to the reader factory.
    pub fn bound_contract(&self) -> BoundContract {
        BoundContract {
            address: self.registry_address.clone(),
            name: self.contract_name.clone(),
        }
    }
}
