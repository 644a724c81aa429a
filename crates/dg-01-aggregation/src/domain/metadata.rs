//! Workflow metadata observations.
//!
//! Each gateway node reports which public keys are authorised to trigger a
//! workflow. The aggregator only trusts a key set once enough nodes agree.

use serde::{Deserialize, Serialize};

use super::digest::{canonical_digest, Digestible};
use crate::error::{AggregationError, AggregationResult};

/// Identifies a deployed workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowSelector {
    pub workflow_id: String,
    pub workflow_name: String,
    pub workflow_owner: String,
    pub workflow_tag: String,
}

impl WorkflowSelector {
    pub fn new(
        workflow_id: impl Into<String>,
        workflow_name: impl Into<String>,
        workflow_owner: impl Into<String>,
        workflow_tag: impl Into<String>,
    ) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            workflow_name: workflow_name.into(),
            workflow_owner: workflow_owner.into(),
            workflow_tag: workflow_tag.into(),
        }
    }

    /// All four fields must be non-empty.
    pub fn validate(&self) -> AggregationResult<()> {
        let fields = [
            ("workflow_id", &self.workflow_id),
            ("workflow_name", &self.workflow_name),
            ("workflow_owner", &self.workflow_owner),
            ("workflow_tag", &self.workflow_tag),
        ];
        for (field, value) in fields {
            if value.is_empty() {
                return Err(AggregationError::InvalidSelector { field });
            }
        }
        Ok(())
    }
}

/// Signature scheme of an authorised key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    #[serde(rename = "ecdsa_evm")]
    EcdsaEvm,
}

/// A key allowed to trigger a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorizedKey {
    pub key_type: KeyType,
    pub public_key: String,
}

impl AuthorizedKey {
    pub fn ecdsa_evm(public_key: impl Into<String>) -> Self {
        Self {
            key_type: KeyType::EcdsaEvm,
            public_key: public_key.into(),
        }
    }
}

/// One node's view of a workflow's authorised keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub workflow_selector: WorkflowSelector,
    #[serde(default)]
    pub authorized_keys: Vec<AuthorizedKey>,
}

impl WorkflowMetadata {
    pub fn new(workflow_selector: WorkflowSelector, authorized_keys: Vec<AuthorizedKey>) -> Self {
        Self {
            workflow_selector,
            authorized_keys,
        }
    }
}

impl Digestible for WorkflowMetadata {
    fn digest(&self) -> AggregationResult<String> {
        canonical_digest(self)
    }
}
