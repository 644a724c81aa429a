//! Threshold aggregation of identical node responses.
//!
//! Not synchronised. One aggregator serves one request, and the caller
//! serialises `collect` calls.

use std::collections::HashMap;

use super::digest::Digestible;
use super::node_set::NodeSet;
use crate::error::{AggregationError, AggregationResult};

/// Releases a response once `threshold` distinct nodes have sent one with
/// the same digest.
///
/// A node belongs to exactly one digest group. If it changes its answer it
/// is moved, and a group left without members is dropped.
#[derive(Debug)]
pub struct ResponseAggregator<T> {
    threshold: usize,
    responses: HashMap<String, NodeSet>,
    node_to_response: HashMap<String, String>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> ResponseAggregator<T>
where
    T: Digestible + Clone,
{
    pub fn new(threshold: usize) -> AggregationResult<Self> {
        if threshold == 0 {
            return Err(AggregationError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            responses: HashMap::new(),
            node_to_response: HashMap::new(),
            _marker: std::marker::PhantomData,
        })
    }

    /// Record `node_address`'s response and return it if its group has
    /// reached the threshold.
    pub fn collect(
        &mut self,
        response: Option<&T>,
        node_address: &str,
    ) -> AggregationResult<Option<T>> {
        let response = response.ok_or(AggregationError::NilResponse)?;
        if node_address.is_empty() {
            return Err(AggregationError::EmptyNodeAddress);
        }
        let digest = response.digest()?;

        let previous = self
            .node_to_response
            .get(node_address)
            .filter(|previous| **previous != digest)
            .cloned();
        if let Some(previous) = previous {
            self.detach(&previous, node_address);
        }

        let members = self.responses.entry(digest.clone()).or_default();
        members.add(node_address);
        let count = members.len();
        self.node_to_response
            .insert(node_address.to_string(), digest);

        if count >= self.threshold {
            Ok(Some(response.clone()))
        } else {
            Ok(None)
        }
    }

    fn detach(&mut self, digest: &str, node_address: &str) {
        if let Some(members) = self.responses.get_mut(digest) {
            members.remove(node_address);
            if members.is_empty() {
                self.responses.remove(digest);
            }
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of live digest groups.
    pub fn group_count(&self) -> usize {
        self.responses.len()
    }

    /// Digest last reported by `node_address`.
    pub fn current_digest(&self, node_address: &str) -> Option<&str> {
        self.node_to_response.get(node_address).map(String::as_str)
    }

    /// Members of the `digest` group.
    pub fn members(&self, digest: &str) -> Option<&NodeSet> {
        self.responses.get(digest)
    }
}
