//! Error types for the Registry Syncer subsystem

use shared_types::{DonId, PeerId, ServiceError};
use thiserror::Error;

/// Errors from local registry queries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// One of the three top-level maps is empty; the registry has not
    /// been synced yet
    #[error("empty local registry: no {0} registered in the local registry")]
    EmptyRegistry(&'static str),

    /// The local peer id could not be resolved
    #[error("unable to get local node: peer networking has not started yet ({0})")]
    PeerIdUnavailable(String),

    #[error("could not find peer id {0}")]
    NodeNotFound(PeerId),

    /// No DON is configured for the capability
    #[error("could not find DON for capability {0}")]
    CapabilityNotFound(String),

    #[error("could not find DON {0}")]
    DonNotFound(DonId),

    #[error("could not find capability configuration for capability {capability_id} and DON {don_id}")]
    CapabilityConfigNotFound {
        capability_id: String,
        don_id: DonId,
    },

    /// A DON member could not be resolved to a node
    #[error("could not fetch nodes for DON {don_id}: {source}")]
    NodeResolution {
        don_id: DonId,
        #[source]
        source: Box<RegistryError>,
    },

    /// The configuration payload could not be decoded
    #[error("failed to decode capability configuration: {0}")]
    Decode(String),
}

/// Errors from the synchronizer
#[derive(Debug, Error)]
pub enum SyncError {
    /// The chain reader could not be created or bound
    #[error("failed to initialise chain reader: {0}")]
    ReaderInit(String),

    /// A registry read failed
    #[error("failed to read {method} from the remote registry: {reason}")]
    ChainRead {
        method: &'static str,
        reason: String,
    },

    /// The on-chain data contradicts itself
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The synchronizer configuration is unusable
    #[error("invalid syncer configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Lifecycle(#[from] ServiceError),
}

/// Errors from the snapshot store and its storage drivers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage failure: {0}")]
    Storage(String),

    /// No snapshot has been persisted yet
    #[error("no registry state persisted")]
    NoRows,
}

pub type RegistryResult<T> = Result<T, RegistryError>;
pub type SyncResult<T> = Result<T, SyncError>;
pub type StoreResult<T> = Result<T, StoreError>;
