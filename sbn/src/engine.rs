//! The protocol engine's drive loop: the runtime glue around
//! `sbn_core::liveness::evaluate` and the inbound dispatch algorithm.
//!
//! `sbn-core` is sans-IO — it decides *what* should happen. This module
//! is the one layer up that actually sends frames and talks to the
//! `SoftwareBus`.

use bytes::Bytes;
use tracing::{info, warn};

use sbn_core::identity::{CpuId, Ident, Mid, QosHint};
use sbn_core::liveness::{self, LivenessAction, PeerStatus, Thresholds};
use sbn_core::mirror::SubscriptionMirror;
use sbn_core::net::Net;
use sbn_core::peer::Peer;

use sbn_wire::frame::{Frame, MsgType};
use sbn_wire::transport::Transport;

use crate::sb::{SbMessage, SoftwareBus};

/// Run one liveness tick for every peer on `net`, sending whatever
/// frames `sbn_core::liveness::evaluate` decides each peer needs, and
/// applying the resulting state transition.
pub async fn run_liveness_tick(
    net: &mut Net,
    now: u64,
    thresholds: &Thresholds,
    local_ident: &Ident,
    local_cpu_id: CpuId,
    transport: &mut dyn Transport,
) {
    for peer in net.peers_mut() {
        let status = PeerStatus {
            state: peer.state(),
            last_send: peer.last_send(),
            last_recv: peer.last_recv(),
        };
        let (new_state, actions) = liveness::evaluate(&status, now, thresholds);
        peer.set_state(new_state);

        for action in actions {
            match action {
                LivenessAction::SendAnnounce => {
                    send_announce(peer, local_cpu_id, local_ident, transport, now).await;
                }
                LivenessAction::SendHeartbeat => {
                    send_frame(peer, local_cpu_id, MsgType::Heartbeat, Bytes::new(), transport, now)
                        .await;
                }
                LivenessAction::DeclareLost => {
                    info!(peer = %peer.processor_id(), name = peer.name(), "peer lost connection");
                }
            }
        }
    }
}

async fn send_announce(
    peer: &mut Peer,
    local_cpu_id: CpuId,
    local_ident: &Ident,
    transport: &mut dyn Transport,
    now: u64,
) {
    send_frame(
        peer,
        local_cpu_id,
        MsgType::Announce,
        Bytes::copy_from_slice(local_ident.as_str().as_bytes()),
        transport,
        now,
    )
    .await;
}

async fn send_frame(
    peer: &mut Peer,
    local_cpu_id: CpuId,
    msg_type: MsgType,
    payload: Bytes,
    transport: &mut dyn Transport,
    now: u64,
) {
    let frame = Frame::new(msg_type, local_cpu_id, payload);
    match transport.send(&frame).await {
        Ok(()) => peer.mark_sent(now),
        Err(err) => warn!(peer = %peer.processor_id(), error = %err, "transport send failed"),
    }
}

/// Dispatch one inbound frame: promote the sender's liveness state,
/// send the subscription handshake on promotion, and republish `APP`
/// payloads or apply `SUBSCRIBE`/`UNSUBSCRIBE` records as side effects.
pub async fn dispatch_inbound(
    net: &mut Net,
    frame: Frame,
    now: u64,
    local_cpu_id: CpuId,
    local_ident: &Ident,
    local_subs: &SubscriptionMirror,
    transport: &mut dyn Transport,
    bus: &mut dyn SoftwareBus,
) {
    let Some(peer) = net.find_mut(frame.cpu_id) else {
        warn!(cpu_id = %frame.cpu_id, "dropping frame from unknown peer");
        return;
    };

    if frame.msg_type == MsgType::Announce {
        let remote_ident = String::from_utf8_lossy(&frame.payload);
        if remote_ident.as_ref() != local_ident.as_str() {
            info!(peer = %peer.processor_id(), remote = %remote_ident, local = %local_ident, "version mismatch with peer");
        }
    }

    let was_announcing = !peer.is_heartbeating();
    let promoted = peer.mark_received(now);

    if promoted || (was_announcing && frame.msg_type == MsgType::Announce) {
        info!(peer = %peer.processor_id(), name = peer.name(), "peer alive");
        send_subscription_snapshot(peer, local_cpu_id, local_subs, transport, now).await;
    }

    match frame.msg_type {
        MsgType::NoMsg | MsgType::Announce | MsgType::Heartbeat => {}
        MsgType::App => {
            if frame.payload.len() < 2 {
                warn!(peer = %peer.processor_id(), "dropping undersized APP frame");
                return;
            }
            let mid = Mid::new(u16::from_be_bytes([frame.payload[0], frame.payload[1]]));
            let body = frame.payload.slice(2..);
            if let Err(err) = bus.publish(mid, body).await {
                warn!(peer = %peer.processor_id(), error = %err, "software bus republish failed");
            }
        }
        MsgType::Subscribe => {
            if let Some((mid, _qos)) = decode_sub_record(&frame.payload) {
                peer.add_remote_sub(mid);
            }
        }
        MsgType::Unsubscribe => {
            if let Some((mid, _qos)) = decode_sub_record(&frame.payload) {
                peer.remove_remote_sub(mid);
            }
        }
    }
}

/// Send the full local subscription snapshot to a newly `Heartbeating`
/// peer: one `SUBSCRIBE` frame per local subscription.
pub async fn send_subscription_snapshot(
    peer: &mut Peer,
    local_cpu_id: CpuId,
    local_subs: &SubscriptionMirror,
    transport: &mut dyn Transport,
    now: u64,
) {
    for (mid, qos) in local_subs.snapshot() {
        let payload = encode_sub_record(mid, qos);
        send_frame(peer, local_cpu_id, MsgType::Subscribe, payload, transport, now).await;
    }
}

fn decode_sub_record(payload: &[u8]) -> Option<(Mid, QosHint)> {
    if payload.len() < 3 {
        return None;
    }
    let mid = Mid::new(u16::from_be_bytes([payload[0], payload[1]]));
    let qos = QosHint(payload[2]);
    Some((mid, qos))
}

/// Encode one `(MessageId, QosHint)` record for a `SUBSCRIBE`/
/// `UNSUBSCRIBE` payload.
#[must_use]
pub fn encode_sub_record(mid: Mid, qos: QosHint) -> Bytes {
    let mut buf = Vec::with_capacity(3);
    buf.extend_from_slice(&mid.0.to_be_bytes());
    buf.push(qos.0);
    Bytes::from(buf)
}
