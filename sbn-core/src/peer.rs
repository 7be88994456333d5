//! Per-remote-processor peer record.

use hashbrown::HashSet;

use crate::identity::{CpuId, Mid};
pub use crate::liveness::PeerState;

/// Display name length budget; purely cosmetic, used in logs and
/// housekeeping telemetry.
pub const PEER_NAME_MAX_LEN: usize = 16;

/// Per-remote-processor state tracked within one `Net`.
///
/// `Peer` owns the set of message ids this peer has declared interest in
/// (`RemoteSubs`); the Forwarder consults it, and only the Protocol Engine
/// mutates it on inbound `SUBSCRIBE`/`UNSUBSCRIBE` frames.
#[derive(Debug, Clone)]
pub struct Peer {
    processor_id: CpuId,
    name: String,
    state: PeerState,
    last_send: u64,
    last_recv: u64,
    remote_subs: HashSet<Mid>,
}

impl Peer {
    /// Create a peer record. New peers always start `Announcing`:
    /// `Heartbeating` requires a real inbound frame.
    #[must_use]
    pub fn new(processor_id: CpuId, name: impl Into<String>) -> Self {
        let mut name = name.into();
        name.truncate(PEER_NAME_MAX_LEN);
        Self {
            processor_id,
            name,
            state: PeerState::Announcing,
            last_send: 0,
            last_recv: 0,
            remote_subs: HashSet::new(),
        }
    }

    #[must_use]
    pub const fn processor_id(&self) -> CpuId {
        self.processor_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn state(&self) -> PeerState {
        self.state
    }

    #[must_use]
    pub const fn last_send(&self) -> u64 {
        self.last_send
    }

    #[must_use]
    pub const fn last_recv(&self) -> u64 {
        self.last_recv
    }

    #[must_use]
    pub const fn is_heartbeating(&self) -> bool {
        matches!(self.state, PeerState::Heartbeating)
    }

    /// Record that a frame was just sent to this peer.
    pub fn mark_sent(&mut self, now: u64) {
        self.last_send = now;
    }

    /// Record that a frame was just received from this peer. Returns
    /// `true` if this causes a promotion from `Announcing` to
    /// `Heartbeating` (only a real inbound frame promotes, never a
    /// timer).
    pub fn mark_received(&mut self, now: u64) -> bool {
        self.last_recv = now;
        if matches!(self.state, PeerState::Announcing) {
            self.state = PeerState::Heartbeating;
            true
        } else {
            false
        }
    }

    /// Force the state, used by the engine to apply [`crate::liveness`]
    /// transitions (e.g. timeout -> `Announcing`).
    pub fn set_state(&mut self, state: PeerState) {
        if matches!(state, PeerState::Announcing) {
            // Losing the peer discards whatever it told us it wanted.
            self.remote_subs.clear();
        }
        self.state = state;
    }

    /// Add `mid` to this peer's remote subscription set. Idempotent:
    /// at most one record per `MessageId`.
    pub fn add_remote_sub(&mut self, mid: Mid) {
        self.remote_subs.insert(mid);
    }

    /// Remove `mid` from this peer's remote subscription set. Idempotent.
    pub fn remove_remote_sub(&mut self, mid: Mid) {
        self.remote_subs.remove(&mid);
    }

    /// Whether this peer has declared interest in `mid`. The Forwarder
    /// never delivers outside this set.
    #[must_use]
    pub fn subscribes_to(&self, mid: Mid) -> bool {
        self.remote_subs.contains(&mid)
    }

    #[must_use]
    pub fn remote_subs(&self) -> impl Iterator<Item = &Mid> {
        self.remote_subs.iter()
    }

    #[must_use]
    pub fn remote_sub_count(&self) -> usize {
        self.remote_subs.len()
    }
}
