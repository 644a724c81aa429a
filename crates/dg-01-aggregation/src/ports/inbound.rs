//! Inbound port: what gateway handlers call on the metadata aggregator.

use crate::domain::WorkflowMetadata;
use crate::error::AggregationResult;

/// Concurrency-safe observation aggregation.
pub trait MetadataAggregatorApi: Send + Sync {
    /// Record `observation` as reported by `node_address`.
    ///
    /// Rejects an incomplete selector or empty address without touching
    /// state.
    fn collect(&self, observation: &WorkflowMetadata, node_address: &str)
        -> AggregationResult<()>;

    /// Observations reported by at least `threshold` nodes, newest digest
    /// group first.
    fn aggregate(&self) -> AggregationResult<Vec<WorkflowMetadata>>;
}
