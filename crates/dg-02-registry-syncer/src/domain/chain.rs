//! Raw records as read from the registry contract.

use shared_types::{Bytes32, U256};

/// One entry of `getCapabilities`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnchainCapability {
    pub hashed_id: Bytes32,
    pub labelled_name: String,
    pub version: String,
    pub capability_type: u8,
    pub response_type: u8,
    pub configuration_contract: String,
    pub is_deprecated: bool,
}

/// Capability configuration entry of a DON, keyed by hashed capability id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnchainCapabilityConfiguration {
    pub capability_id: Bytes32,
    pub config: Vec<u8>,
}

/// One entry of `getDONs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnchainDon {
    pub id: u32,
    pub name: String,
    pub families: Vec<String>,
    pub config_count: u32,
    pub f: u8,
    pub is_public: bool,
    pub accepts_workflows: bool,
    pub node_p2p_ids: Vec<Bytes32>,
    pub capability_configurations: Vec<OnchainCapabilityConfiguration>,
    pub config: Vec<u8>,
}

/// One entry of `getNodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnchainNode {
    pub node_operator_id: u32,
    pub config_count: u32,
    pub workflow_don_id: u32,
    pub signer: Bytes32,
    pub p2p_id: Bytes32,
    pub encryption_public_key: Bytes32,
    pub csa_key: Bytes32,
    pub hashed_capability_ids: Vec<Bytes32>,
    pub capabilities_don_ids: Vec<U256>,
}
