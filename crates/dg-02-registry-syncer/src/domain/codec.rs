//! Persisted form of a `LocalRegistry`.
//!
//! JSON with byte words as hex strings and 256-bit DON ids as decimal
//! strings. Every map is a `BTreeMap`, so encoding the same registry twice
//! yields identical bytes and the content hash is stable.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{DonId, PeerId};
use std::collections::BTreeMap;

use super::entities::{Capability, NodeInfo, RegistryDon};
use super::local_registry::LocalRegistry;
use crate::error::{StoreError, StoreResult};

#[derive(Serialize)]
struct PersistedRegistryRef<'a> {
    ids_to_dons: &'a BTreeMap<DonId, RegistryDon>,
    ids_to_nodes: &'a BTreeMap<PeerId, NodeInfo>,
    ids_to_capabilities: &'a BTreeMap<String, Capability>,
}

#[derive(Deserialize)]
struct PersistedRegistry {
    #[serde(default)]
    ids_to_dons: BTreeMap<DonId, RegistryDon>,
    #[serde(default)]
    ids_to_nodes: BTreeMap<PeerId, NodeInfo>,
    #[serde(default)]
    ids_to_capabilities: BTreeMap<String, Capability>,
}

/// Serialize the registry's contents.
pub fn encode_registry(registry: &LocalRegistry) -> StoreResult<String> {
    serde_json::to_string(&PersistedRegistryRef {
        ids_to_dons: &registry.ids_to_dons,
        ids_to_nodes: &registry.ids_to_nodes,
        ids_to_capabilities: &registry.ids_to_capabilities,
    })
    .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Rebuild a registry. The result has no collaborators attached.
pub fn decode_registry(data: &str) -> StoreResult<LocalRegistry> {
    let persisted: PersistedRegistry = serde_json::from_str(data)
        .map_err(|e| StoreError::Serialization(format!("failed to unmarshal state: {e}")))?;
    Ok(LocalRegistry::new(
        persisted.ids_to_dons,
        persisted.ids_to_nodes,
        persisted.ids_to_capabilities,
    ))
}

/// Hex SHA-256 of the encoded form.
pub fn content_hash(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}
