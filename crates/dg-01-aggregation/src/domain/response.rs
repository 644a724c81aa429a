//! JSON-RPC 2.0 response envelope as returned by gateway nodes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::digest::{canonical_digest, Digestible};
use crate::error::AggregationResult;

/// Error object of a JSON-RPC response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC response carrying either a `result` or an `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

fn default_version() -> String {
    "2.0".to_string()
}

impl JsonRpcResponse {
    /// Successful response.
    pub fn success(id: impl Into<String>, result: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: None,
            result: Some(result),
            error: None,
        }
    }

    /// Error response.
    pub fn failure(id: impl Into<String>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: None,
            result: None,
            error: Some(WireError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Response with neither result nor error.
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: None,
            result: None,
            error: None,
        }
    }
}

impl Digestible for JsonRpcResponse {
    fn digest(&self) -> AggregationResult<String> {
        canonical_digest(self)
    }
}
