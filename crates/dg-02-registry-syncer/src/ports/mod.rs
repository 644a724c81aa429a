//! Ports (hexagonal boundaries) for the Registry Syncer subsystem.

pub mod inbound;
pub mod outbound;

pub use inbound::RegistrySyncerApi;
pub use outbound::{
    CapabilityConfigDecoder, ChainReader, ChainReaderFactory, PeerIdProvider, RegistryListener,
    RegistryStore, StateRow, StateTransaction, StorageDriver,
};
