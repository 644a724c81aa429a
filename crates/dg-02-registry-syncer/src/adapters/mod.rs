//! Adapters implementing the outbound ports.

pub mod config_decoder;
pub mod memory;
pub mod peer_id;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use config_decoder::JsonCapabilityConfigDecoder;
pub use memory::InMemoryStorageDriver;
pub use peer_id::SharedPeerIdProvider;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStorageDriver};
