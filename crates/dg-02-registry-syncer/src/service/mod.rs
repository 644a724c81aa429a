//! # Registry Synchronizer Service
//!
//! Keeps a local snapshot of the on-chain capability registry and pushes a
//! private copy of it to every listener after each sync.
//!
//! ## Background Tasks
//!
//! ```text
//! sync loop ──try_send──→ [hand-off queue] ──recv──→ persistence loop ──→ RegistryStore
//!     │
//!     └──deep copy──→ listeners
//! ```
//!
//! The sync loop runs once at start (trying the persisted snapshot first)
//! and then once per tick. The hand-off never blocks. The queue holds one
//! pending snapshot while the persistence loop is busy writing the previous
//! one; any further snapshot offered while that slot is full is not
//! persisted. Both loops exit on the shared cancellation token.


use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{
    Bytes32, HealthReport, PeerId, Service, ServiceError, ServiceState, StateMachine,
};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::SyncerConfig;
use crate::domain::{
    capability_id, Capability, CapabilityConfigBlob, CapabilityType, Don, LocalRegistry,
    NodeInfo, RegistryDon,
};
use crate::error::{SyncError, SyncResult};
use crate::metrics;
use crate::ports::inbound::RegistrySyncerApi;
use crate::ports::outbound::{
    CapabilityConfigDecoder, ChainReader, ChainReaderFactory, PeerIdProvider, RegistryListener,
    RegistryStore,
};

/// Service name used in logs and health reports
pub const SERVICE_NAME: &str = "RegistrySyncer";

/// State shared between the service handle and its background loops.
struct SyncerInner {
    config: SyncerConfig,
    reader_factory: Arc<dyn ChainReaderFactory>,
    /// Created and bound on first use
    reader: tokio::sync::Mutex<Option<Arc<dyn ChainReader>>>,
    store: Arc<dyn RegistryStore>,
    peer_id_provider: Arc<dyn PeerIdProvider>,
    config_decoder: Arc<dyn CapabilityConfigDecoder>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    /// Dropped on close, which ends the persistence loop
    update_tx: Mutex<Option<mpsc::Sender<LocalRegistry>>>,
    shutdown: CancellationToken,
}

impl SyncerInner {
    async fn sync(&self, is_initial_sync: bool) -> SyncResult<()> {
        let listeners = self.listeners.read().clone();
        if listeners.is_empty() {
            warn!("[dg-02] Sync called, but no listeners are registered; nooping");
            return Ok(());
        }

        let _timer = metrics::start_sync_timer();
        let reader = self.reader().await?;

        let mut latest = None;
        if is_initial_sync {
            match self.store.latest_local_registry().await {
                Ok(mut registry) => {
                    debug!("[dg-02] Using the persisted registry snapshot for the initial sync");
                    registry.attach(
                        Arc::clone(&self.peer_id_provider),
                        Arc::clone(&self.config_decoder),
                    );
                    latest = Some(registry);
                }
                Err(e) => {
                    warn!(error = %e, "[dg-02] Failed to load local registry, importing from chain");
                }
            }
        }

        let registry = match latest {
            Some(registry) => registry,
            None => {
                let registry = self.import_onchain_registry(reader.as_ref()).await?;
                self.hand_off(&registry);
                registry
            }
        };

        for listener in listeners {
            if let Err(e) = listener.on_new_registry(registry.deep_copy()).await {
                error!(error = %e, "[dg-02] Error calling registry listener");
                metrics::record_listener_failure();
            }
        }
        Ok(())
    }

    /// Cached reader, creating and binding it if this is the first use.
    async fn reader(&self) -> SyncResult<Arc<dyn ChainReader>> {
        let mut cached = self.reader.lock().await;
        if let Some(reader) = cached.as_ref() {
            return Ok(Arc::clone(reader));
        }

        let contract = self.config.bound_contract();
        let reader = self
            .reader_factory
            .new_chain_reader(&contract)
            .await
            .map_err(SyncError::ReaderInit)?;
        reader.bind(&contract).await.map_err(SyncError::ReaderInit)?;

        info!(address = %contract.address, contract = %contract.name, "[dg-02] Chain reader bound");
        *cached = Some(Arc::clone(&reader));
        Ok(reader)
    }

    async fn import_onchain_registry(&self, reader: &dyn ChainReader) -> SyncResult<LocalRegistry> {
        let capabilities = reader
            .get_capabilities()
            .await
            .map_err(|reason| SyncError::ChainRead {
                method: "getCapabilities",
                reason,
            })?;

        let mut hashed_to_id: HashMap<Bytes32, String> = HashMap::new();
        let mut ids_to_capabilities = BTreeMap::new();
        for capability in capabilities {
            let id = capability_id(&capability.labelled_name, &capability.version);
            hashed_to_id.insert(capability.hashed_id, id.clone());
            ids_to_capabilities.insert(
                id.clone(),
                Capability {
                    id,
                    capability_type: CapabilityType::from_onchain(capability.capability_type),
                },
            );
        }

        let dons = reader
            .get_dons()
            .await
            .map_err(|reason| SyncError::ChainRead {
                method: "getDONs",
                reason,
            })?;

        let mut ids_to_dons = BTreeMap::new();
        for don in dons {
            let mut capability_configurations = BTreeMap::new();
            for entry in don.capability_configurations {
                let id = hashed_to_id.get(&entry.capability_id).ok_or_else(|| {
                    SyncError::InvariantViolation(format!(
                        "capability id not found using hash {}",
                        hex::encode(entry.capability_id)
                    ))
                })?;
                capability_configurations
                    .insert(id.clone(), CapabilityConfigBlob { config: entry.config });
            }

            ids_to_dons.insert(
                don.id,
                RegistryDon {
                    don: Don {
                        name: don.name,
                        id: don.id,
                        families: don.families,
                        config_version: don.config_count,
                        members: don.node_p2p_ids.into_iter().map(PeerId).collect(),
                        f: don.f,
                        is_public: don.is_public,
                        accepts_workflows: don.accepts_workflows,
                        config: don.config,
                    },
                    capability_configurations,
                },
            );
        }

        let nodes = reader
            .get_nodes()
            .await
            .map_err(|reason| SyncError::ChainRead {
                method: "getNodes",
                reason,
            })?;

        let mut ids_to_nodes = BTreeMap::new();
        for node in nodes {
            let peer_id = PeerId(node.p2p_id);
            let mut capability_ids = Vec::with_capacity(node.hashed_capability_ids.len());
            for hashed in &node.hashed_capability_ids {
                match hashed_to_id.get(hashed) {
                    Some(id) => capability_ids.push(id.clone()),
                    None => warn!(
                        peer_id = %peer_id,
                        hashed_id = %hex::encode(hashed),
                        "[dg-02] Node references an unknown capability, skipping it"
                    ),
                }
            }

            ids_to_nodes.insert(
                peer_id,
                NodeInfo {
                    node_operator_id: node.node_operator_id,
                    config_count: node.config_count,
                    workflow_don_id: node.workflow_don_id,
                    signer: node.signer,
                    p2p_id: node.p2p_id,
                    encryption_public_key: node.encryption_public_key,
                    csa_key: node.csa_key,
                    capabilities_don_ids: node.capabilities_don_ids,
                    hashed_capability_ids: node.hashed_capability_ids,
                    capability_ids,
                },
            );
        }

        debug!(
            capabilities = ids_to_capabilities.len(),
            dons = ids_to_dons.len(),
            nodes = ids_to_nodes.len(),
            "[dg-02] Imported registry from chain"
        );

        Ok(
            LocalRegistry::new(ids_to_dons, ids_to_nodes, ids_to_capabilities)
                .with_peer_id_provider(Arc::clone(&self.peer_id_provider))
                .with_config_decoder(Arc::clone(&self.config_decoder)),
        )
    }

    /// Offer a copy of `registry` to the persistence loop without waiting.
    fn hand_off(&self, registry: &LocalRegistry) {
        if self.shutdown.is_cancelled() {
            debug!("[dg-02] Shutting down, registry update not persisted");
            return;
        }
        let sender = self.update_tx.lock().clone();
        let Some(sender) = sender else {
            return;
        };
        match sender.try_send(registry.deep_copy()) {
            Ok(()) => debug!("[dg-02] Registry update handed to the persistence loop"),
            Err(TrySendError::Full(_)) => {
                debug!("[dg-02] Persistence loop busy, registry update skipped")
            }
            Err(TrySendError::Closed(_)) => {
                debug!("[dg-02] Persistence loop gone, registry update skipped")
            }
        }
    }
}

async fn run_sync_loop(inner: Arc<SyncerInner>) {
    let shutdown = inner.shutdown.clone();

    debug!("[dg-02] Starting initial sync with remote registry");
    tokio::select! {
        _ = shutdown.cancelled() => return,
        result = inner.sync(true) => {
            if let Err(e) = result {
                error!(error = %e, "[dg-02] Failed to sync with remote registry");
            }
        }
    }

    let period = inner.config.tick_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                debug!("[dg-02] Periodic sync with remote registry");
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    result = inner.sync(false) => {
                        if let Err(e) = result {
                            error!(error = %e, "[dg-02] Failed to sync with remote registry");
                            metrics::record_remote_sync_failure();
                        }
                    }
                }
            }
        }
    }
    debug!("[dg-02] Sync loop stopped");
}

async fn run_persistence_loop(
    store: Arc<dyn RegistryStore>,
    mut updates: mpsc::Receiver<LocalRegistry>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            update = updates.recv() => {
                let Some(registry) = update else { break };
                if let Err(e) = store.add_local_registry(&registry).await {
                    error!(error = %e, "[dg-02] Failed to save registry state");
                }
            }
        }
    }
    debug!("[dg-02] Persistence loop stopped");
}

/// Periodically imports the capability registry and fans it out to
/// listeners.
///
/// Safe to share: `sync` and `add_listener` may be called from any task,
/// including while the background loops run.
pub struct RegistrySyncer {
    inner: Arc<SyncerInner>,
    lifecycle: StateMachine,
    update_rx: Mutex<Option<mpsc::Receiver<LocalRegistry>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RegistrySyncer {
    pub fn new(
        config: SyncerConfig,
        reader_factory: Arc<dyn ChainReaderFactory>,
        store: Arc<dyn RegistryStore>,
        peer_id_provider: Arc<dyn PeerIdProvider>,
        config_decoder: Arc<dyn CapabilityConfigDecoder>,
    ) -> SyncResult<Self> {
        config.validate()?;
        let (update_tx, update_rx) = mpsc::channel(config.update_queue_capacity);
        Ok(Self {
            inner: Arc::new(SyncerInner {
                config,
                reader_factory,
                reader: tokio::sync::Mutex::new(None),
                store,
                peer_id_provider,
                config_decoder,
                listeners: RwLock::new(Vec::new()),
                update_tx: Mutex::new(Some(update_tx)),
                shutdown: CancellationToken::new(),
            }),
            lifecycle: StateMachine::new(),
            update_rx: Mutex::new(Some(update_rx)),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &SyncerConfig {
        &self.inner.config
    }

    /// Lifecycle state (`Unstarted`, `Started`, `Stopped`).
    pub fn state(&self) -> ServiceState {
        self.lifecycle.state()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

#[async_trait]
impl RegistrySyncerApi for RegistrySyncer {
    async fn sync(&self, is_initial_sync: bool) -> SyncResult<()> {
        self.inner.sync(is_initial_sync).await
    }

    fn add_listener(&self, listener: Arc<dyn RegistryListener>) {
        self.inner.listeners.write().push(listener);
    }
}

#[async_trait]
impl Service for RegistrySyncer {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn start(&self) -> Result<(), ServiceError> {
        self.lifecycle.start_once(SERVICE_NAME)?;

        let mut tasks = Vec::with_capacity(2);
        tasks.push(tokio::spawn(run_sync_loop(Arc::clone(&self.inner))));
        if let Some(updates) = self.update_rx.lock().take() {
            tasks.push(tokio::spawn(run_persistence_loop(
                Arc::clone(&self.inner.store),
                updates,
                self.inner.shutdown.clone(),
            )));
        }
        *self.tasks.lock() = tasks;

        info!(
            address = %self.inner.config.registry_address,
            tick_secs = self.inner.config.tick_interval.as_secs(),
            "[dg-02] Registry syncer started"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.lifecycle.stop_once(SERVICE_NAME)?;
        self.inner.shutdown.cancel();
        self.inner.update_tx.lock().take();

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "[dg-02] Background task ended abnormally");
            }
        }

        info!("[dg-02] Registry syncer stopped");
        Ok(())
    }

    fn health_report(&self) -> HealthReport {
        self.lifecycle.health_report(SERVICE_NAME)
    }
}
