//! # Registry Domain
//!
//! Snapshot model, queries, identifiers and the persisted codec. No I/O.

pub mod capability_config;
pub mod capability_id;
pub mod chain;
pub mod codec;
pub mod entities;
pub mod local_registry;

pub use capability_config::{
    AggregatorConfig, CapabilityConfiguration, CapabilityMethodConfig, MethodRemoteConfig,
    RemoteConfig, RemoteExecutableConfig, RemoteTargetConfig, RemoteTriggerConfig,
    RequestHasherType, TransmissionSchedule,
};
pub use capability_id::{capability_id, hashed_capability_id, parse_capability_id};
pub use chain::{OnchainCapability, OnchainCapabilityConfiguration, OnchainDon, OnchainNode};
pub use codec::{content_hash, decode_registry, encode_registry};
pub use entities::{
    BoundContract, Capability, CapabilityConfigBlob, CapabilityType, Don, DonWithNodes, Node,
    NodeInfo, RegistryDon,
};
pub use local_registry::LocalRegistry;
