//! # Telemetry Exposition
//!
//! Subsystem activity shows up in the shared Prometheus registry.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dg_01_aggregation::{MetadataAggregatorConfig, WorkflowMetadataAggregator};
    use dg_02_registry_syncer::{
        InMemoryStorageDriver, LocalRegistry, RegistryStateStore, RegistryStore,
    };

    #[tokio::test]
    async fn test_subsystem_metrics_are_exported() {
        // Registration fails if another test got there first
        let _ = dg_telemetry::register_metrics();

        let aggregator =
            WorkflowMetadataAggregator::new(MetadataAggregatorConfig::default()).unwrap();
        aggregator.reap_observations();

        let store = RegistryStateStore::new(Arc::new(InMemoryStorageDriver::new()));
        let before = dg_telemetry::REGISTRY_STATES_PERSISTED.get();
        store
            .add_local_registry(&LocalRegistry::default())
            .await
            .unwrap();
        assert!(dg_telemetry::REGISTRY_STATES_PERSISTED.get() > before);

        let text = dg_telemetry::encode_metrics().unwrap();
        assert!(text.contains("dg_aggregation_observation_groups"));
        assert!(text.contains("dg_registry_states_persisted_total"));
    }
}
