//! # Local Registry
//!
//! In-memory snapshot of the capability registry plus the read queries the
//! rest of the node uses ("which DONs serve capability X", "which DON am I
//! in").
//!
//! A snapshot is built wholesale by an import (from chain or from storage)
//! and not mutated afterwards. Consumers that need a stable view take a
//! `deep_copy`; every map and list is owned, so the copy shares nothing
//! mutable with the source. The peer-id provider and configuration decoder
//! are shared handles, not data, and are carried over as-is.

use shared_types::{DonId, PeerId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

use super::capability_config::CapabilityConfiguration;
use super::entities::{Capability, Don, DonWithNodes, Node, NodeInfo, RegistryDon};
use crate::error::{RegistryError, RegistryResult};
use crate::ports::outbound::{CapabilityConfigDecoder, PeerIdProvider};

#[derive(Clone, Default)]
pub struct LocalRegistry {
    pub ids_to_dons: BTreeMap<DonId, RegistryDon>,
    pub ids_to_nodes: BTreeMap<PeerId, NodeInfo>,
    /// Full capability id -> capability
    pub ids_to_capabilities: BTreeMap<String, Capability>,
    peer_id_provider: Option<Arc<dyn PeerIdProvider>>,
    config_decoder: Option<Arc<dyn CapabilityConfigDecoder>>,
}

impl LocalRegistry {
    pub fn new(
        ids_to_dons: BTreeMap<DonId, RegistryDon>,
        ids_to_nodes: BTreeMap<PeerId, NodeInfo>,
        ids_to_capabilities: BTreeMap<String, Capability>,
    ) -> Self {
        Self {
            ids_to_dons,
            ids_to_nodes,
            ids_to_capabilities,
            peer_id_provider: None,
            config_decoder: None,
        }
    }

    pub fn with_peer_id_provider(mut self, provider: Arc<dyn PeerIdProvider>) -> Self {
        self.peer_id_provider = Some(provider);
        self
    }

    pub fn with_config_decoder(mut self, decoder: Arc<dyn CapabilityConfigDecoder>) -> Self {
        self.config_decoder = Some(decoder);
        self
    }

    /// Re-attach the runtime collaborators a snapshot loses when it is
    /// persisted.
    pub fn attach(
        &mut self,
        provider: Arc<dyn PeerIdProvider>,
        decoder: Arc<dyn CapabilityConfigDecoder>,
    ) {
        self.peer_id_provider = Some(provider);
        self.config_decoder = Some(decoder);
    }

    /// Independent copy of the snapshot.
    ///
    /// Every map, list and nested record is owned by value, so `Clone` is
    /// already a full deep copy. Only the peer-id provider and configuration
    /// decoder `Arc` handles are shared with the source.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// `true` if any of the three maps is empty.
    pub fn is_empty(&self) -> bool {
        self.ensure_not_empty().is_err()
    }

    /// This node's own record.
    pub fn local_node(&self) -> RegistryResult<Node> {
        let provider = self.peer_id_provider.as_ref().ok_or_else(|| {
            RegistryError::PeerIdUnavailable("no peer id provider attached".to_string())
        })?;
        let peer_id = provider
            .peer_id()
            .map_err(RegistryError::PeerIdUnavailable)?;
        self.node_by_peer_id(&peer_id)
    }

    /// Resolve `peer_id` against every DON it is a member of.
    ///
    /// The first workflow-accepting DON found becomes the node's workflow
    /// DON. Membership in a second one is a registry misconfiguration; it is
    /// logged and otherwise ignored.
    pub fn node_by_peer_id(&self, peer_id: &PeerId) -> RegistryResult<Node> {
        self.ensure_not_empty()?;
        let info = self
            .ids_to_nodes
            .get(peer_id)
            .ok_or(RegistryError::NodeNotFound(*peer_id))?;

        let mut workflow_don: Option<Don> = None;
        let mut capability_dons = Vec::new();
        for registry_don in self.ids_to_dons.values() {
            let don = &registry_don.don;
            if !don.has_member(peer_id) {
                continue;
            }
            if don.accepts_workflows {
                match &workflow_don {
                    None => {
                        debug!(don_id = don.id, "[dg-02] Workflow DON identified");
                        workflow_don = Some(don.clone());
                    }
                    Some(first) => {
                        error!(
                            peer_id = %peer_id,
                            first_don = first.id,
                            extra_don = don.id,
                            "[dg-02] Configuration error: node belongs to more than one workflow DON"
                        );
                    }
                }
            }
            capability_dons.push(don.clone());
        }

        Ok(Node {
            peer_id: *peer_id,
            node_operator_id: info.node_operator_id,
            signer: info.signer,
            encryption_public_key: info.encryption_public_key,
            workflow_don,
            capability_dons,
        })
    }

    /// Every DON configured for `capability_id`, with members resolved.
    ///
    /// Fails as a whole if any member of a matching DON is unknown.
    pub fn dons_for_capability(&self, capability_id: &str) -> RegistryResult<Vec<DonWithNodes>> {
        self.ensure_not_empty()?;

        let mut found = Vec::new();
        for registry_don in self.ids_to_dons.values() {
            if !registry_don
                .capability_configurations
                .contains_key(capability_id)
            {
                continue;
            }
            let nodes = self.nodes_for_don(&registry_don.don).map_err(|e| {
                RegistryError::NodeResolution {
                    don_id: registry_don.don.id,
                    source: Box::new(e),
                }
            })?;
            found.push(DonWithNodes {
                don: registry_don.don.clone(),
                nodes,
            });
        }

        if found.is_empty() {
            return Err(RegistryError::CapabilityNotFound(capability_id.to_string()));
        }
        Ok(found)
    }

    fn nodes_for_don(&self, don: &Don) -> RegistryResult<Vec<Node>> {
        don.members
            .iter()
            .map(|peer_id| self.node_by_peer_id(peer_id))
            .collect()
    }

    /// Decoded configuration of `capability_id` on DON `don_id`.
    pub fn config_for_capability(
        &self,
        capability_id: &str,
        don_id: DonId,
    ) -> RegistryResult<CapabilityConfiguration> {
        self.ensure_not_empty()?;
        let don = self
            .ids_to_dons
            .get(&don_id)
            .ok_or(RegistryError::DonNotFound(don_id))?;
        let blob = don.capability_configurations.get(capability_id).ok_or_else(|| {
            RegistryError::CapabilityConfigNotFound {
                capability_id: capability_id.to_string(),
                don_id,
            }
        })?;

        let decoder = self.config_decoder.as_ref().ok_or_else(|| {
            RegistryError::Decode("no capability configuration decoder attached".to_string())
        })?;
        decoder.decode(&blob.config).map_err(RegistryError::Decode)
    }

    fn ensure_not_empty(&self) -> RegistryResult<()> {
        if self.ids_to_dons.is_empty() {
            return Err(RegistryError::EmptyRegistry("DONs"));
        }
        if self.ids_to_nodes.is_empty() {
            return Err(RegistryError::EmptyRegistry("nodes"));
        }
        if self.ids_to_capabilities.is_empty() {
            return Err(RegistryError::EmptyRegistry("capabilities"));
        }
        Ok(())
    }
}

/// Two registries are equal when their contents are; attached collaborators
/// are ignored.
impl PartialEq for LocalRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.ids_to_dons == other.ids_to_dons
            && self.ids_to_nodes == other.ids_to_nodes
            && self.ids_to_capabilities == other.ids_to_capabilities
    }
}

impl Eq for LocalRegistry {}

impl fmt::Debug for LocalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalRegistry")
            .field("ids_to_dons", &self.ids_to_dons)
            .field("ids_to_nodes", &self.ids_to_nodes)
            .field("ids_to_capabilities", &self.ids_to_capabilities)
            .field("peer_id_provider", &self.peer_id_provider.is_some())
            .field("config_decoder", &self.config_decoder.is_some())
            .finish()
    }
}
