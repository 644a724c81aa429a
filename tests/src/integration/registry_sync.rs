//! # Registry Sync Flows
//!
//! The synchronizer driven against a scripted chain, a shared storage
//! driver and recording listeners:
//!
//! 1. **Start**: initial import reaches every listener and is persisted
//! 2. **Change**: a new DON on chain shows up in the next sync and adds a row
//! 3. **Restart**: a fresh syncer with an unreachable chain serves the
//!    persisted snapshot

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::{Mutex, RwLock};
    use primitive_types::U256;
    use std::sync::Arc;
    use std::time::Duration;

    use dg_02_registry_syncer::{
        hashed_capability_id, BoundContract, ChainReader, ChainReaderFactory,
        InMemoryStorageDriver, JsonCapabilityConfigDecoder, LocalRegistry, OnchainCapability,
        OnchainCapabilityConfiguration, OnchainDon, OnchainNode, RegistryListener,
        RegistryStateStore, RegistrySyncer, RegistrySyncerApi, SharedPeerIdProvider,
        SyncerConfig,
    };
    use shared_types::{PeerId, Service};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    #[derive(Default)]
    struct ChainState {
        capabilities: Vec<OnchainCapability>,
        dons: Vec<OnchainDon>,
        nodes: Vec<OnchainNode>,
        offline: bool,
    }

    /// Chain whose contents the test edits between syncs
    #[derive(Default)]
    struct ScriptedChain {
        state: RwLock<ChainState>,
    }

    impl ScriptedChain {
        fn read<T>(&self, f: impl FnOnce(&ChainState) -> T) -> Result<T, String> {
            let state = self.state.read();
            if state.offline {
                return Err("rpc endpoint unreachable".to_string());
            }
            Ok(f(&state))
        }
    }

    #[async_trait]
    impl ChainReader for ScriptedChain {
        async fn bind(&self, _contract: &BoundContract) -> Result<(), String> {
            Ok(())
        }

        async fn get_capabilities(&self) -> Result<Vec<OnchainCapability>, String> {
            self.read(|s| s.capabilities.clone())
        }

        async fn get_dons(&self) -> Result<Vec<OnchainDon>, String> {
            self.read(|s| s.dons.clone())
        }

        async fn get_nodes(&self) -> Result<Vec<OnchainNode>, String> {
            self.read(|s| s.nodes.clone())
        }
    }

    struct ScriptedFactory(Arc<ScriptedChain>);

    #[async_trait]
    impl ChainReaderFactory for ScriptedFactory {
        async fn new_chain_reader(
            &self,
            _contract: &BoundContract,
        ) -> Result<Arc<dyn ChainReader>, String> {
            let reader: Arc<dyn ChainReader> = self.0.clone();
            Ok(reader)
        }
    }

    #[derive(Default)]
    struct Recorder {
        registries: Mutex<Vec<LocalRegistry>>,
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.registries.lock().len()
        }

        fn last(&self) -> Option<LocalRegistry> {
            self.registries.lock().last().cloned()
        }
    }

    #[async_trait]
    impl RegistryListener for Recorder {
        async fn on_new_registry(&self, registry: LocalRegistry) -> Result<(), String> {
            self.registries.lock().push(registry);
            Ok(())
        }
    }

    fn don(id: u32, accepts_workflows: bool, members: &[u8], hashed: [u8; 32]) -> OnchainDon {
        OnchainDon {
            id,
            name: format!("don-{id}"),
            config_count: 1,
            f: 1,
            is_public: true,
            accepts_workflows,
            node_p2p_ids: members.iter().map(|n| [*n; 32]).collect(),
            capability_configurations: vec![OnchainCapabilityConfiguration {
                capability_id: hashed,
                config: br#"{"remote_config":{"type":"target"}}"#.to_vec(),
            }],
            ..Default::default()
        }
    }

    fn seeded_chain() -> Arc<ScriptedChain> {
        let write = hashed_capability_id("write_ethereum-testnet-sepolia", "1.0.0");
        let chain = ScriptedChain::default();
        {
            let mut state = chain.state.write();
            state.capabilities = vec![OnchainCapability {
                hashed_id: write,
                labelled_name: "write_ethereum-testnet-sepolia".into(),
                version: "1.0.0".into(),
                capability_type: 3,
                ..Default::default()
            }];
            state.dons = vec![don(1, true, &[1, 2, 3, 4], write)];
            state.nodes = (1u8..=6)
                .map(|n| OnchainNode {
                    node_operator_id: 1,
                    p2p_id: [n; 32],
                    signer: [n; 32],
                    hashed_capability_ids: vec![write],
                    capabilities_don_ids: vec![U256::from(1u8)],
                    ..Default::default()
                })
                .collect();
        }
        Arc::new(chain)
    }

    fn syncer(
        chain: &Arc<ScriptedChain>,
        driver: &Arc<InMemoryStorageDriver>,
        local_peer: u8,
    ) -> RegistrySyncer {
        RegistrySyncer::new(
            SyncerConfig::new("0x00000000000000000000000000000000000000aa"),
            Arc::new(ScriptedFactory(Arc::clone(chain))),
            Arc::new(RegistryStateStore::new(Arc::clone(driver))),
            Arc::new(SharedPeerIdProvider::with_peer_id(PeerId([local_peer; 32]))),
            Arc::new(JsonCapabilityConfigDecoder),
        )
        .unwrap()
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..300 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_sync_persist_and_update() {
        let chain = seeded_chain();
        let driver = Arc::new(InMemoryStorageDriver::new());
        let syncer = syncer(&chain, &driver, 1);
        let recorder = Arc::new(Recorder::default());
        syncer.add_listener(recorder.clone());

        syncer.start().await.unwrap();
        wait_for(|| recorder.count() == 1 && driver.row_count() == 1).await;

        let registry = recorder.last().unwrap();
        let node = registry.local_node().unwrap();
        assert_eq!(node.workflow_don.as_ref().map(|d| d.id), Some(1));

        // A capability DON appears on chain
        {
            let mut state = chain.state.write();
            let hashed = state.capabilities[0].hashed_id;
            state.dons.push(don(2, false, &[5, 6], hashed));
        }
        syncer.sync(false).await.unwrap();
        wait_for(|| driver.row_count() == 2).await;

        let registry = recorder.last().unwrap();
        let dons = registry
            .dons_for_capability("write_ethereum-testnet-sepolia@1.0.0")
            .unwrap();
        assert_eq!(dons.len(), 2);
        assert_eq!(dons[1].nodes.len(), 2);

        syncer.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_restart_serves_persisted_snapshot() {
        let chain = seeded_chain();
        let driver = Arc::new(InMemoryStorageDriver::new());

        let first = syncer(&chain, &driver, 2);
        let before = Arc::new(Recorder::default());
        first.add_listener(before.clone());
        first.start().await.unwrap();
        wait_for(|| driver.row_count() == 1).await;
        first.close().await.unwrap();

        chain.state.write().offline = true;

        let second = syncer(&chain, &driver, 2);
        let after = Arc::new(Recorder::default());
        second.add_listener(after.clone());
        second.sync(true).await.unwrap();

        let restored = after.last().unwrap();
        assert_eq!(restored, before.last().unwrap());
        assert_eq!(
            restored.local_node().unwrap().peer_id,
            PeerId([2; 32])
        );

        // Later syncs need the chain
        assert!(second.sync(false).await.is_err());
    }

    #[tokio::test]
    async fn test_unchanged_chain_persists_once() {
        let chain = seeded_chain();
        let driver = Arc::new(InMemoryStorageDriver::new());
        let syncer = syncer(&chain, &driver, 1);
        syncer.add_listener(Arc::new(Recorder::default()));

        syncer.start().await.unwrap();
        wait_for(|| driver.row_count() == 1).await;
        for _ in 0..3 {
            syncer.sync(false).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        syncer.close().await.unwrap();

        assert_eq!(driver.row_count(), 1);
    }
}
