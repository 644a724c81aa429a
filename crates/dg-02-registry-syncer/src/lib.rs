//! # Registry Syncer Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Mirrors the on-chain capability registry into a local snapshot that the
//! rest of the gateway queries without touching the chain: which DON serves
//! a capability, which nodes make up a DON, which DON this node belongs to,
//! and how a capability is configured on a given DON.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | `LocalRegistry` | Immutable snapshot plus read queries; fails fast until synced |
//! | `RegistrySyncer` | Managed service: periodic chain import, listener fan-out, hand-off to persistence |
//! | `RegistryStateStore` | Deduplicated, retention-bounded snapshot history over a `StorageDriver` |
//!
//! ## Module Structure
//!
//! ```text
//! domain/    entities, capability ids, decoded configuration, LocalRegistry, codec
//! ports/     RegistrySyncerApi (inbound); ChainReader, RegistryStore, StorageDriver, ... (outbound)
//! adapters/  JSON config decoder, peer id provider, in-memory and RocksDB storage drivers
//! service/   RegistrySyncer
//! store      RegistryStateStore
//! ```
//!
//! ## Feature Flags
//!
//! - `metrics` (default): write to the `dg-telemetry` collectors
//! - `rocksdb`: enable `RocksDbStorageDriver`

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod store;

pub use adapters::{InMemoryStorageDriver, JsonCapabilityConfigDecoder, SharedPeerIdProvider};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStorageDriver};
pub use config::SyncerConfig;
pub use domain::{
    capability_id, hashed_capability_id, parse_capability_id, BoundContract, Capability,
    CapabilityConfigBlob, CapabilityConfiguration, CapabilityType, Don, DonWithNodes,
    LocalRegistry, Node, NodeInfo, OnchainCapability, OnchainCapabilityConfiguration, OnchainDon,
    OnchainNode, RegistryDon,
};
pub use error::{RegistryError, RegistryResult, StoreError, StoreResult, SyncError, SyncResult};
pub use ports::{
    CapabilityConfigDecoder, ChainReader, ChainReaderFactory, PeerIdProvider, RegistryListener,
    RegistryStore, RegistrySyncerApi, StateRow, StateTransaction, StorageDriver,
};
pub use service::RegistrySyncer;
pub use store::{RegistryStateStore, REGISTRY_STATE_RETENTION};
