//! Set of node addresses reporting the same digest.

use std::collections::HashSet;

/// Unordered set of unique node addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<String>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node`. Returns `false` if it was already present.
    pub fn add(&mut self, node: impl Into<String>) -> bool {
        self.nodes.insert(node.into())
    }

    /// Remove `node`. Returns `false` if it was absent.
    pub fn remove(&mut self, node: &str) -> bool {
        self.nodes.remove(node)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    /// Members sorted, for stable logs and assertions.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nodes.iter().cloned().collect();
        nodes.sort();
        nodes
    }
}

impl<S: Into<String>> FromIterator<S> for NodeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(Into::into).collect(),
        }
    }
}
