//! # Outbound Ports
//!
//! Collaborators the synchronizer drives. Chain-facing ports report failures
//! as plain strings; the service wraps them with context.

use async_trait::async_trait;
use shared_types::PeerId;
use std::sync::Arc;

use crate::domain::{
    BoundContract, CapabilityConfiguration, LocalRegistry, OnchainCapability, OnchainDon,
    OnchainNode,
};
use crate::error::StoreResult;

/// Reads the capability registry contract.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Validate that the contract is live. Makes a network call, so it must
    /// not run before peer networking is up.
    async fn bind(&self, contract: &BoundContract) -> Result<(), String>;

    async fn get_capabilities(&self) -> Result<Vec<OnchainCapability>, String>;

    async fn get_dons(&self) -> Result<Vec<OnchainDon>, String>;

    async fn get_nodes(&self) -> Result<Vec<OnchainNode>, String>;
}

/// Builds chain readers for a contract.
#[async_trait]
pub trait ChainReaderFactory: Send + Sync {
    async fn new_chain_reader(
        &self,
        contract: &BoundContract,
    ) -> Result<Arc<dyn ChainReader>, String>;
}

/// Resolves this node's own peer id.
pub trait PeerIdProvider: Send + Sync {
    fn peer_id(&self) -> Result<PeerId, String>;
}

/// Decodes a DON's encoded capability configuration.
pub trait CapabilityConfigDecoder: Send + Sync {
    fn decode(&self, raw: &[u8]) -> Result<CapabilityConfiguration, String>;
}

/// Receives a private copy of every synced registry.
#[async_trait]
pub trait RegistryListener: Send + Sync {
    async fn on_new_registry(&self, registry: LocalRegistry) -> Result<(), String>;
}

/// Durable snapshot storage.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Persist `registry` unless it matches the latest stored snapshot.
    async fn add_local_registry(&self, registry: &LocalRegistry) -> StoreResult<()>;

    /// Load the most recently persisted snapshot.
    async fn latest_local_registry(&self) -> StoreResult<LocalRegistry>;
}

/// One stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRow {
    /// Monotonic insertion id, used only for recency
    pub id: u64,
    /// Serialized snapshot
    pub data: String,
    /// Hex SHA-256 of `data`
    pub data_hash: String,
}

/// Statements available inside a storage transaction.
pub trait StateTransaction {
    /// Insert a row unless `data_hash` equals the latest row's hash.
    /// Returns the new row id, or `None` if nothing was inserted.
    fn insert_if_latest_differs(&mut self, data: &str, data_hash: &str)
        -> StoreResult<Option<u64>>;

    /// Delete every row whose hash is not among the hashes of the `keep`
    /// most recent rows. Returns the number of rows deleted.
    fn retain_recent_hashes(&mut self, keep: usize) -> StoreResult<usize>;
}

/// Transactional table of snapshot rows.
pub trait StorageDriver: Send + Sync {
    /// Run `body` in one transaction. Its effects become visible only if it
    /// returns `Ok`.
    fn transact(
        &self,
        body: &mut dyn FnMut(&mut dyn StateTransaction) -> StoreResult<()>,
    ) -> StoreResult<()>;

    /// Most recent row, if any.
    fn latest_row(&self) -> StoreResult<Option<StateRow>>;
}
