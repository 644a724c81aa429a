//! # Aggregation Flows
//!
//! Gateway-side consensus over node answers:
//!
//! 1. **Responses**: JSON-RPC answers that differ only in formatting agree
//! 2. **Metadata**: several nodes report workflow keys, the agreed set is
//!    released newest first and expires once nodes stop reporting

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use dg_01_aggregation::{
        AuthorizedKey, JsonRpcResponse, MetadataAggregatorApi, MetadataAggregatorConfig,
        ResponseAggregator, WorkflowMetadata, WorkflowMetadataAggregator, WorkflowSelector,
    };
    use shared_types::Service;

    fn node_answer(raw: &str) -> JsonRpcResponse {
        serde_json::from_str(raw).unwrap()
    }

    fn workflow(n: u32, key: &str) -> WorkflowMetadata {
        WorkflowMetadata::new(
            WorkflowSelector::new(
                format!("wf-{n}"),
                format!("workflow {n}"),
                "0xowner",
                "v1",
            ),
            vec![AuthorizedKey::ecdsa_evm(key)],
        )
    }

    #[test]
    fn test_formatting_does_not_split_consensus() {
        let mut aggregator = ResponseAggregator::new(3).unwrap();
        let answers = [
            (
                "node-a",
                r#"{"jsonrpc":"2.0","id":"req-1","result":{"balance":"10","block":7}}"#,
            ),
            (
                "node-b",
                r#"{ "id": "req-1", "jsonrpc": "2.0", "result": { "block": 7, "balance": "10" } }"#,
            ),
            (
                "node-c",
                r#"{"jsonrpc":"2.0","id":"req-1","result":{"block":7,"balance":"10"}}"#,
            ),
        ];

        let mut released = None;
        for (node, raw) in answers {
            released = aggregator.collect(Some(&node_answer(raw)), node).unwrap();
        }
        let released = released.expect("three matching answers reach the threshold");
        assert_eq!(released.result.unwrap()["block"], 7);
        assert_eq!(aggregator.group_count(), 1);
    }

    #[test]
    fn test_outlier_needs_replacement() {
        let mut aggregator = ResponseAggregator::new(2).unwrap();
        let good = node_answer(r#"{"id":"1","result":"ok"}"#);
        let bad = node_answer(r#"{"id":"1","error":{"code":-32000,"message":"stale"}}"#);

        assert!(aggregator.collect(Some(&good), "node-a").unwrap().is_none());
        assert!(aggregator.collect(Some(&bad), "node-b").unwrap().is_none());
        // node-a changing its answer does not count twice
        assert!(aggregator.collect(Some(&bad), "node-a").unwrap().is_some());
        assert_eq!(aggregator.group_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_consensus_and_expiry() {
        let aggregator = Arc::new(
            WorkflowMetadataAggregator::new(MetadataAggregatorConfig::new(
                2,
                Duration::from_secs(1),
            ))
            .unwrap(),
        );
        aggregator.start().await.unwrap();

        for node in ["node-a", "node-b", "node-c"] {
            aggregator.collect(&workflow(1, "0xk1"), node).unwrap();
        }
        for node in ["node-a", "node-b"] {
            aggregator.collect(&workflow(2, "0xk2"), node).unwrap();
        }
        aggregator.collect(&workflow(3, "0xk3"), "node-c").unwrap();

        let agreed = aggregator.aggregate().unwrap();
        assert_eq!(agreed, vec![workflow(2, "0xk2"), workflow(1, "0xk1")]);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(aggregator.aggregate().unwrap().is_empty());
        assert_eq!(aggregator.group_count(), 0);
        assert_eq!(aggregator.tracked_node_count(), 0);

        aggregator.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_reporters() {
        let aggregator = Arc::new(
            WorkflowMetadataAggregator::new(MetadataAggregatorConfig::new(
                4,
                Duration::from_secs(60),
            ))
            .unwrap(),
        );

        let mut handles = Vec::new();
        for n in 0..8 {
            let aggregator = Arc::clone(&aggregator);
            handles.push(tokio::spawn(async move {
                aggregator
                    .collect(&workflow(1, "0xshared"), &format!("node-{n}"))
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(aggregator.aggregate().unwrap().len(), 1);
        assert_eq!(aggregator.tracked_node_count(), 8);
    }
}
