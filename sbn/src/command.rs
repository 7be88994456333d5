//! Ground-command handling.
//!
//! SBN's own command set beyond the frame protocol itself is intentionally
//! small: most configuration happens at init, and the dynamic surface a
//! ground system can reach is limited to the commands in
//! [`crate::sb::Command`].

use tracing::{info, warn};

use sbn_core::net::Net;
use sbn_core::peer::PeerState;

use crate::sb::Command;

/// Outcome of processing one command: whether the main loop should keep
/// running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Shutdown,
}

/// Apply one ground command to `net`.
pub fn apply(net: &mut Net, command: Command) -> CommandOutcome {
    match command {
        Command::Noop => CommandOutcome::Continue,
        Command::Shutdown => {
            info!("shutdown command received");
            CommandOutcome::Shutdown
        }
        Command::ResetPeer(cpu_id) => {
            match net.find_mut(cpu_id) {
                Some(peer) => {
                    info!(peer = %cpu_id, "ground command: resetting peer to Announcing");
                    peer.set_state(PeerState::Announcing);
                }
                None => warn!(peer = %cpu_id, "ground command referenced unknown peer"),
            }
            CommandOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbn_core::identity::CpuId;
    use sbn_core::peer::Peer;

    #[test]
    fn shutdown_command_stops_the_loop() {
        let mut net = Net::new("udp0", Vec::<Peer>::new());
        assert_eq!(apply(&mut net, Command::Shutdown), CommandOutcome::Shutdown);
    }

    #[test]
    fn reset_peer_forces_announcing_and_clears_subs() {
        let mut peer = Peer::new(CpuId::new(2), "B");
        peer.mark_received(5);
        peer.add_remote_sub(sbn_core::identity::Mid::new(1));
        let mut net = Net::new("udp0", vec![peer]);

        let outcome = apply(&mut net, Command::ResetPeer(CpuId::new(2)));
        assert_eq!(outcome, CommandOutcome::Continue);
        assert_eq!(net.find(CpuId::new(2)).unwrap().state(), PeerState::Announcing);
        assert_eq!(net.find(CpuId::new(2)).unwrap().remote_sub_count(), 0);
    }

    #[test]
    fn reset_unknown_peer_is_a_noop() {
        let mut net = Net::new("udp0", Vec::<Peer>::new());
        let outcome = apply(&mut net, Command::ResetPeer(CpuId::new(99)));
        assert_eq!(outcome, CommandOutcome::Continue);
    }
}
