//! Error types for the Aggregation subsystem

use shared_types::ServiceError;
use thiserror::Error;

/// Aggregation subsystem errors
///
/// Every variant except `Lifecycle` is a caller-input or digest failure:
/// it is returned before any state is written and is not worth retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    /// Threshold must be at least one
    #[error("threshold must be greater than 0, got {0}")]
    InvalidThreshold(usize),

    /// No response was supplied
    #[error("response cannot be nil")]
    NilResponse,

    /// Node address was empty
    #[error("node address cannot be empty")]
    EmptyNodeAddress,

    /// A workflow selector field was empty
    #[error("invalid workflow selector: {field} is empty")]
    InvalidSelector { field: &'static str },

    /// The reported value could not be hashed
    #[error("failed to compute digest: {0}")]
    DigestFailed(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Start/close contract violated
    #[error(transparent)]
    Lifecycle(#[from] ServiceError),
}

/// Result alias for aggregation operations
pub type AggregationResult<T> = Result<T, AggregationError>;
