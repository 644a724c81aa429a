//! # Registry Store
//!
//! Snapshot persistence over a `StorageDriver`. Each update is one
//! transaction: a conditional insert (skipped when the content hash equals
//! the latest row's) followed by the retention delete.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::{content_hash, decode_registry, encode_registry, LocalRegistry};
use crate::error::{StoreError, StoreResult};
use crate::metrics;
use crate::ports::outbound::{RegistryStore, StorageDriver};

/// Distinct snapshot hashes kept after each update.
pub const REGISTRY_STATE_RETENTION: usize = 10;

/// `RegistryStore` backed by any `StorageDriver`.
pub struct RegistryStateStore<D> {
    driver: Arc<D>,
}

impl<D: StorageDriver> RegistryStateStore<D> {
    pub fn new(driver: Arc<D>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }
}

#[async_trait]
impl<D: StorageDriver + 'static> RegistryStore for RegistryStateStore<D> {
    async fn add_local_registry(&self, registry: &LocalRegistry) -> StoreResult<()> {
        let data = encode_registry(registry)?;
        let hash = content_hash(&data);

        let mut inserted = None;
        let mut pruned = 0;
        self.driver.transact(&mut |tx| {
            inserted = tx.insert_if_latest_differs(&data, &hash)?;
            pruned = tx.retain_recent_hashes(REGISTRY_STATE_RETENTION)?;
            Ok(())
        })?;

        match inserted {
            Some(id) => {
                metrics::record_state_persisted();
                debug!(id, hash = %hash, pruned, "[dg-02] Registry state persisted");
            }
            None => debug!(hash = %hash, "[dg-02] Registry state unchanged, nothing persisted"),
        }
        Ok(())
    }

    async fn latest_local_registry(&self) -> StoreResult<LocalRegistry> {
        let row = self.driver.latest_row()?.ok_or(StoreError::NoRows)?;
        decode_registry(&row.data)
    }
}
