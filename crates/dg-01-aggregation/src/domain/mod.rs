//! # Aggregation Domain
//!
//! Pure data structures and algorithms. Nothing here spawns tasks or takes
//! locks; the service layer adds both.

pub mod digest;
pub mod metadata;
pub mod node_set;
pub mod response;
pub mod response_aggregator;

pub use digest::{canonical_digest, Digestible};
pub use metadata::{AuthorizedKey, KeyType, WorkflowMetadata, WorkflowSelector};
pub use node_set::NodeSet;
pub use response::{JsonRpcResponse, WireError};
pub use response_aggregator::ResponseAggregator;
