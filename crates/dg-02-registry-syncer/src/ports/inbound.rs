//! Inbound port: the operations callers drive on the synchronizer.

use async_trait::async_trait;
use std::sync::Arc;

use super::outbound::RegistryListener;
use crate::error::SyncResult;

/// Registry synchronizer API.
#[async_trait]
pub trait RegistrySyncerApi: Send + Sync {
    /// Reconcile the registry and notify every listener.
    ///
    /// On the initial sync the last persisted snapshot is tried first.
    async fn sync(&self, is_initial_sync: bool) -> SyncResult<()>;

    /// Register listeners for future syncs.
    fn add_listener(&self, listener: Arc<dyn RegistryListener>);
}
