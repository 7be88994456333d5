//! A named transport endpoint and its bounded peer table.

use crate::identity::CpuId;
use crate::peer::Peer;

/// One named transport instance (e.g. one UDP net, one serial net) and the
/// ordered, bounded set of peers reachable through it.
///
/// Peers are created once at init from the peer configuration file and
/// never destroyed until shutdown; the `Vec` is never resized after
/// [`Net::new`].
#[derive(Debug)]
pub struct Net {
    name: String,
    peers: Vec<Peer>,
}

impl Net {
    #[must_use]
    pub fn new(name: impl Into<String>, peers: Vec<Peer>) -> Self {
        Self {
            name: name.into(),
            peers,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    #[must_use]
    pub fn peers_mut(&mut self) -> &mut [Peer] {
        &mut self.peers
    }

    /// Find a peer by its `CpuID` within this Net. `(Net, ProcessorID)`
    /// uniquely identifies a peer.
    #[must_use]
    pub fn find(&self, processor_id: CpuId) -> Option<&Peer> {
        self.peers.iter().find(|p| p.processor_id() == processor_id)
    }

    /// Mutable variant of [`Net::find`].
    pub fn find_mut(&mut self, processor_id: CpuId) -> Option<&mut Peer> {
        self.peers.iter_mut().find(|p| p.processor_id() == processor_id)
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Peers currently in the `Heartbeating` state, i.e. the Forwarder's
    /// and the subscription mirror's fan-out targets.
    pub fn heartbeating_peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.iter().filter(|p| p.is_heartbeating())
    }
}
