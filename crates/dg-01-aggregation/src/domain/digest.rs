//! Content digests.
//!
//! A digest is the lowercase hex SHA-256 of the value's canonical JSON.
//! `serde_json::Value` keeps object keys sorted, so two payloads that differ
//! only in key order or whitespace produce the same digest.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{AggregationError, AggregationResult};

/// A value that can be grouped by content.
pub trait Digestible {
    fn digest(&self) -> AggregationResult<String>;
}

/// Hex SHA-256 over the canonical JSON form of `value`.
pub fn canonical_digest<T: Serialize + ?Sized>(value: &T) -> AggregationResult<String> {
    let canonical =
        serde_json::to_value(value).map_err(|e| AggregationError::DigestFailed(e.to_string()))?;
    let bytes = serde_json::to_vec(&canonical)
        .map_err(|e| AggregationError::DigestFailed(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: serde_json::Value = serde_json::from_str(r#"{"a": 1, "b": 2}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{ "b":2,"a":1 }"#).unwrap();
        assert_eq!(canonical_digest(&a).unwrap(), canonical_digest(&b).unwrap());
    }

    #[test]
    fn test_different_content_differs() {
        let a = canonical_digest(&json!({"result": "success"})).unwrap();
        let b = canonical_digest(&json!({"result": "failure"})).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }
}
