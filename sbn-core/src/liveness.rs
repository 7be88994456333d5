//! The per-peer liveness state machine.
//!
//! This is a pure, sans-IO function of peer state + clock + thresholds:
//! it takes no lock, performs no I/O, and is driven once per scheduler
//! tick by `sbn::engine`.

use smallvec::SmallVec;

/// Liveness state of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    /// Initial state; terminal on connection loss. The peer periodically
    /// re-announces until a frame is heard back from it.
    Announcing,
    /// A frame has been heard from the peer recently enough that it's
    /// considered alive.
    Heartbeating,
}

/// The three configured liveness thresholds, `T_announce < T_hb_send <
/// T_hb_timeout`.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    /// How often an `Announcing` peer is re-announced.
    pub t_announce: u64,
    /// How long without any outbound traffic before a `HEARTBEAT` is sent.
    pub t_hb_send: u64,
    /// How long without any inbound traffic before a peer is considered lost.
    pub t_hb_timeout: u64,
}

impl Thresholds {
    /// Validate the ordering invariant `T_announce < T_hb_send <
    /// T_hb_timeout` required for liveness transitions to make sense.
    #[must_use]
    pub const fn is_well_ordered(&self) -> bool {
        self.t_announce < self.t_hb_send && self.t_hb_send < self.t_hb_timeout
    }
}

/// Minimal view of a peer's liveness-relevant state, independent of how the
/// caller stores the rest of the peer record.
#[derive(Debug, Clone, Copy)]
pub struct PeerStatus {
    pub state: PeerState,
    pub last_send: u64,
    pub last_recv: u64,
}

/// An action the caller (the protocol engine) must perform as a result of
/// evaluating one tick. Multiple actions may fire in the same tick (e.g. a
/// heartbeat send alongside no transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessAction {
    /// Send `ANNOUNCE(Ident)`; update `LastSend`.
    SendAnnounce,
    /// Send an empty `HEARTBEAT`; update `LastSend`.
    SendHeartbeat,
    /// The peer was just lost: drop `RemoteSubs[Peer]`, transition to
    /// `Announcing`, and log the loss.
    DeclareLost,
}

/// Evaluate one scheduler tick for a single peer and return the resulting
/// new state plus any actions the caller must perform.
///
/// An `Announcing` peer only ever re-announces or waits; a
/// `Heartbeating` peer either times out (losing its subscriptions) or
/// heartbeats if it's been quiet too long.
#[must_use]
pub fn evaluate(
    status: &PeerStatus,
    now: u64,
    thresholds: &Thresholds,
) -> (PeerState, SmallVec<[LivenessAction; 2]>) {
    let mut actions = SmallVec::new();

    match status.state {
        PeerState::Announcing => {
            if now.saturating_sub(status.last_send) > thresholds.t_announce {
                actions.push(LivenessAction::SendAnnounce);
            }
            (PeerState::Announcing, actions)
        }
        PeerState::Heartbeating => {
            if now.saturating_sub(status.last_recv) > thresholds.t_hb_timeout {
                actions.push(LivenessAction::DeclareLost);
                return (PeerState::Announcing, actions);
            }
            if now.saturating_sub(status.last_send) > thresholds.t_hb_send {
                actions.push(LivenessAction::SendHeartbeat);
            }
            (PeerState::Heartbeating, actions)
        }
    }
}
