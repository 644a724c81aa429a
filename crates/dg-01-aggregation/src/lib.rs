//! # Aggregation Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Gateway nodes answer the same request independently. This crate decides
//! when enough of them agree: reports are grouped by content digest and a
//! value is released once a threshold of distinct nodes back it.
//!
//! ## Components
//!
//! | Component | Concurrency | Purpose |
//! |-----------|-------------|---------|
//! | `ResponseAggregator` | single owner | One request's JSON-RPC responses; a node that changes its answer is moved between groups |
//! | `WorkflowMetadataAggregator` | `RwLock` | Long-lived workflow metadata; newest-first output, per-node TTL, background reaper |
//!
//! ## Module Structure
//!
//! ```text
//! domain/   NodeSet, Digestible, JsonRpcResponse, WorkflowMetadata, ResponseAggregator
//! ports/    MetadataAggregatorApi (inbound)
//! service/  WorkflowMetadataAggregator (managed service)
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use config::MetadataAggregatorConfig;
pub use domain::{
    canonical_digest, AuthorizedKey, Digestible, JsonRpcResponse, KeyType, NodeSet,
    ResponseAggregator, WireError, WorkflowMetadata, WorkflowSelector,
};
pub use error::{AggregationError, AggregationResult};
pub use ports::MetadataAggregatorApi;
pub use service::WorkflowMetadataAggregator;
