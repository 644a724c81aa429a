//! # Registry Entities
//!
//! The local snapshot of the capability registry: DONs, the nodes that make
//! them up, and the capabilities they serve. Every type here owns its data,
//! so `Clone` is a full deep copy.

use serde::{Deserialize, Serialize};
use shared_types::{hex_bytes32, hex_bytes32_vec, hex_vec, Bytes32, DonId, PeerId, U256};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of work a capability performs, as recorded on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    Trigger,
    Action,
    Consensus,
    Target,
    Unknown,
}

impl CapabilityType {
    /// Map the contract's capability-type byte.
    pub fn from_onchain(value: u8) -> Self {
        match value {
            0 => Self::Trigger,
            1 => Self::Action,
            2 => Self::Consensus,
            3 => Self::Target,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trigger => "trigger",
            Self::Action => "action",
            Self::Consensus => "consensus",
            Self::Target => "target",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A registered capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Full id, `name@version`
    pub id: String,
    pub capability_type: CapabilityType,
}

/// DON description shared with consumers of the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Don {
    #[serde(default)]
    pub name: String,
    pub id: DonId,
    #[serde(default)]
    pub families: Vec<String>,
    pub config_version: u32,
    pub members: Vec<PeerId>,
    /// Fault tolerance: the DON survives `f` faulty members
    pub f: u8,
    pub is_public: bool,
    pub accepts_workflows: bool,
    #[serde(default, with = "hex_vec")]
    pub config: Vec<u8>,
}

impl Don {
    pub fn has_member(&self, peer_id: &PeerId) -> bool {
        self.members.contains(peer_id)
    }
}

/// Encoded configuration of one capability on one DON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfigBlob {
    #[serde(with = "hex_vec")]
    pub config: Vec<u8>,
}

/// A DON together with its per-capability configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDon {
    #[serde(flatten)]
    pub don: Don,
    /// Full capability id -> encoded configuration
    pub capability_configurations: BTreeMap<String, CapabilityConfigBlob>,
}

/// A node as recorded in the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub node_operator_id: u32,
    pub config_count: u32,
    pub workflow_don_id: u32,
    #[serde(with = "hex_bytes32")]
    pub signer: Bytes32,
    #[serde(with = "hex_bytes32")]
    pub p2p_id: Bytes32,
    #[serde(with = "hex_bytes32")]
    pub encryption_public_key: Bytes32,
    #[serde(default, with = "hex_bytes32")]
    pub csa_key: Bytes32,
    /// DONs this node serves capabilities on, as 256-bit integers
    #[serde(with = "decimal_u256_vec")]
    pub capabilities_don_ids: Vec<U256>,
    #[serde(with = "hex_bytes32_vec")]
    pub hashed_capability_ids: Vec<Bytes32>,
    /// Full ids resolved from `hashed_capability_ids`
    #[serde(default)]
    pub capability_ids: Vec<String>,
}

/// A node resolved against the DONs it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub peer_id: PeerId,
    pub node_operator_id: u32,
    pub signer: Bytes32,
    pub encryption_public_key: Bytes32,
    /// The single workflow-accepting DON this node belongs to, if any
    pub workflow_don: Option<Don>,
    /// Every DON this node is a member of
    pub capability_dons: Vec<Don>,
}

/// A DON with its members resolved to nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonWithNodes {
    pub don: Don,
    pub nodes: Vec<Node>,
}

/// Address and name of the registry contract a reader binds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundContract {
    pub address: String,
    pub name: String,
}

/// Serde adapter for `Vec<U256>` stored as decimal strings.
pub mod decimal_u256_vec {
    use serde::ser::SerializeSeq;
    use serde::{de, Deserialize, Deserializer, Serializer};
    use shared_types::U256;

    pub fn serialize<S: Serializer>(values: &[U256], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<U256>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| {
                U256::from_dec_str(s)
                    .map_err(|e| de::Error::custom(format!("invalid decimal {s:?}: {e:?}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_type_mapping() {
        assert_eq!(CapabilityType::from_onchain(0), CapabilityType::Trigger);
        assert_eq!(CapabilityType::from_onchain(1), CapabilityType::Action);
        assert_eq!(CapabilityType::from_onchain(2), CapabilityType::Consensus);
        assert_eq!(CapabilityType::from_onchain(3), CapabilityType::Target);
        assert_eq!(CapabilityType::from_onchain(4), CapabilityType::Unknown);
        assert_eq!(CapabilityType::from_onchain(255), CapabilityType::Unknown);
    }

    #[test]
    fn test_big_don_ids_stored_as_decimal() {
        let node = NodeInfo {
            capabilities_don_ids: vec![U256::from(1u64), U256::MAX],
            ..Default::default()
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["capabilities_don_ids"][0], "1");
        assert_eq!(json["capabilities_don_ids"][1], U256::MAX.to_string());

        let back: NodeInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_registry_don_flattens_descriptor() {
        let don = RegistryDon {
            don: Don {
                id: 7,
                f: 1,
                ..Default::default()
            },
            capability_configurations: BTreeMap::new(),
        };
        let json = serde_json::to_value(&don).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(serde_json::from_value::<RegistryDon>(json).unwrap(), don);
    }
}
