//! # DON Gateway Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | ResponseAggregator | collect (digest + group update) | < 50us per response |
//! | WorkflowMetadataAggregator | aggregate over many groups | < 1ms for 1k groups |
//! | LocalRegistry | dons_for_capability on a 100-DON registry | < 1ms |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

use dg_01_aggregation::{
    AuthorizedKey, JsonRpcResponse, MetadataAggregatorApi, MetadataAggregatorConfig,
    ResponseAggregator, WorkflowMetadata, WorkflowMetadataAggregator, WorkflowSelector,
};
use dg_02_registry_syncer::{
    Capability, CapabilityConfigBlob, CapabilityType, Don, LocalRegistry, NodeInfo, RegistryDon,
};
use shared_types::PeerId;

fn bench_response_collect(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_aggregator");

    for nodes in [4usize, 16, 64] {
        let response = JsonRpcResponse::success(
            "req-1",
            json!({"balance": "1000000000000000000", "block": 19_000_000}),
        );
        let addresses: Vec<String> = (0..nodes).map(|n| format!("node-{n}")).collect();

        group.throughput(Throughput::Elements(nodes as u64));
        group.bench_with_input(BenchmarkId::new("collect", nodes), &nodes, |b, &nodes| {
            b.iter(|| {
                let mut aggregator = ResponseAggregator::new(nodes).unwrap();
                for address in &addresses {
                    black_box(aggregator.collect(Some(&response), address).unwrap());
                }
            })
        });
    }

    group.finish();
}

fn bench_metadata_aggregate(c: &mut Criterion) {
    let aggregator = WorkflowMetadataAggregator::new(MetadataAggregatorConfig::new(
        2,
        Duration::from_secs(60),
    ))
    .unwrap();

    for n in 0..1_000 {
        let metadata = WorkflowMetadata::new(
            WorkflowSelector::new(format!("wf-{n}"), "bench", "0xowner", "v1"),
            vec![AuthorizedKey::ecdsa_evm(format!("0xkey{n}"))],
        );
        aggregator.collect(&metadata, "node-a").unwrap();
        aggregator.collect(&metadata, "node-b").unwrap();
    }

    c.bench_function("metadata_aggregate_1k_groups", |b| {
        b.iter(|| black_box(aggregator.aggregate().unwrap()))
    });
}

fn bench_registry_query(c: &mut Criterion) {
    let mut dons = BTreeMap::new();
    let mut nodes = BTreeMap::new();
    for id in 1..=100u32 {
        let members: Vec<PeerId> = (0..4u8)
            .map(|m| {
                let mut raw = [0u8; 32];
                raw[..4].copy_from_slice(&id.to_be_bytes());
                raw[31] = m;
                PeerId(raw)
            })
            .collect();
        for peer in &members {
            nodes.insert(
                *peer,
                NodeInfo {
                    p2p_id: peer.0,
                    ..Default::default()
                },
            );
        }
        let mut configs = BTreeMap::new();
        configs.insert(
            format!("cap-{}@1.0.0", id % 10),
            CapabilityConfigBlob::default(),
        );
        dons.insert(
            id,
            RegistryDon {
                don: Don {
                    id,
                    members,
                    accepts_workflows: id == 1,
                    ..Default::default()
                },
                capability_configurations: configs,
            },
        );
    }
    let capabilities = (0..10)
        .map(|n| {
            let id = format!("cap-{n}@1.0.0");
            (
                id.clone(),
                Capability {
                    id,
                    capability_type: CapabilityType::Target,
                },
            )
        })
        .collect();
    let registry = LocalRegistry::new(dons, nodes, capabilities);

    c.bench_function("dons_for_capability_100_dons", |b| {
        b.iter(|| black_box(registry.dons_for_capability("cap-3@1.0.0").unwrap()))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench_response_collect, bench_metadata_aggregate, bench_registry_query
}
criterion_main!(benches);
