//! Peer id provider fed by the networking layer once it is up.

use parking_lot::RwLock;
use shared_types::PeerId;

use crate::ports::outbound::PeerIdProvider;

/// Reports an error until `set` is called.
#[derive(Debug, Default)]
pub struct SharedPeerIdProvider {
    peer_id: RwLock<Option<PeerId>>,
}

impl SharedPeerIdProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_peer_id(peer_id: PeerId) -> Self {
        Self {
            peer_id: RwLock::new(Some(peer_id)),
        }
    }

    pub fn set(&self, peer_id: PeerId) {
        *self.peer_id.write() = Some(peer_id);
    }
}

impl PeerIdProvider for SharedPeerIdProvider {
    fn peer_id(&self) -> Result<PeerId, String> {
        (*self.peer_id.read()).ok_or_else(|| "peer networking has not started".to_string())
    }
}
