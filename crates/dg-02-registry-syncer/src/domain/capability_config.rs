//! # Decoded Capability Configuration
//!
//! What a DON's encoded per-capability configuration decodes to. The remote
//! part is a tagged union: a capability is served remotely either as a
//! trigger or as a target, and individual methods may override that as a
//! trigger or as an executable.
//!
//! Durations are carried as milliseconds in the JSON form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DurationMilliSeconds};
use std::collections::BTreeMap;
use std::time::Duration;

/// Fully decoded configuration of one capability on one DON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityConfiguration {
    #[serde(default)]
    pub default_config: Map<String, Value>,
    #[serde(default)]
    pub restricted_keys: Vec<String>,
    #[serde(default)]
    pub restricted_config: Map<String, Value>,
    #[serde(default)]
    pub remote_config: Option<RemoteConfig>,
    #[serde(default)]
    pub method_configs: Option<BTreeMap<String, CapabilityMethodConfig>>,
    #[serde(default)]
    pub local_only: bool,
}

impl CapabilityConfiguration {
    pub fn remote_trigger_config(&self) -> Option<&RemoteTriggerConfig> {
        match &self.remote_config {
            Some(RemoteConfig::Trigger(config)) => Some(config),
            _ => None,
        }
    }

    pub fn remote_target_config(&self) -> Option<&RemoteTargetConfig> {
        match &self.remote_config {
            Some(RemoteConfig::Target(config)) => Some(config),
            _ => None,
        }
    }
}

/// Capability-wide remote configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemoteConfig {
    Trigger(RemoteTriggerConfig),
    Target(RemoteTargetConfig),
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTriggerConfig {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub registration_refresh: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub registration_expiry: Duration,
    #[serde(default)]
    pub min_responses_to_aggregate: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub message_expiry: Duration,
    #[serde(default)]
    pub max_batch_size: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub batch_collection_period: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTargetConfig {
    #[serde(default)]
    pub request_hash_excluded_attributes: Vec<String>,
}

/// How a request is fanned out to the DON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionSchedule {
    #[default]
    AllAtOnce,
    OneAtATime,
}

/// How remote requests are hashed for deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestHasherType {
    #[default]
    Simple,
    WriteReportExcludeSignatures,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteExecutableConfig {
    #[serde(default)]
    pub transmission_schedule: TransmissionSchedule,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub delta_stage: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default)]
    pub request_timeout: Duration,
    #[serde(default)]
    pub server_max_parallel_requests: u32,
    #[serde(default)]
    pub request_hasher_type: RequestHasherType,
}

/// Remote configuration override for one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodRemoteConfig {
    Trigger(RemoteTriggerConfig),
    Executable(RemoteExecutableConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub aggregator_type: String,
}

/// Per-method configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityMethodConfig {
    pub remote_config: MethodRemoteConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregator_config: Option<AggregatorConfig>,
}
