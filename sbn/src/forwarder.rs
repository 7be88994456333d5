//! Forwarder: drains each `Heartbeating` peer's local pipe and hands
//! matching messages to the transport.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use sbn_core::identity::CpuId;
use sbn_core::net::Net;

use sbn_wire::frame::{Frame, MsgType};
use sbn_wire::remap::RemapTable;
use sbn_wire::transport::Transport;

use crate::sb::{SbMessage, SoftwareBus};

/// Drain every `Heartbeating` peer's per-peer pipe once, applying the
/// self-filter, the remap table, and the `RemoteSubs` routing-confinement
/// check before handing frames to `transport`.
pub async fn run_forwarder_pass(
    net: &mut Net,
    local_cpu_id: CpuId,
    local_task_name: &str,
    now: u64,
    remap: &RemapTable,
    bus: &mut dyn SoftwareBus,
    transport: &mut dyn Transport,
) {
    let peer_ids: Vec<CpuId> = net
        .peers()
        .iter()
        .filter(|p| p.is_heartbeating())
        .map(|p| p.processor_id())
        .collect();

    for peer_id in peer_ids {
        loop {
            let Some(msg) = bus.poll_peer_pipe(peer_id).await else {
                break;
            };
            forward_one(net, local_cpu_id, local_task_name, peer_id, now, msg, remap, transport).await;
        }
    }
}

async fn forward_one(
    net: &mut Net,
    local_cpu_id: CpuId,
    local_task_name: &str,
    peer_id: CpuId,
    now: u64,
    msg: SbMessage,
    remap: &RemapTable,
    transport: &mut dyn Transport,
) {
    // Self-filter: never re-forward a message SBN itself just republished
    // locally, or the bridge would loop it straight back out.
    if msg.origin_task == local_task_name {
        return;
    }

    let Some(peer) = net.find_mut(peer_id) else {
        return;
    };

    // Routing confinement: never deliver a MessageId the peer hasn't
    // declared interest in.
    if !peer.subscribes_to(msg.mid) {
        return;
    }

    let outgoing_mid = remap.resolve(peer_id, msg.mid);

    let mut payload = BytesMut::with_capacity(2 + msg.payload.len());
    payload.put_u16(outgoing_mid.0);
    payload.extend_from_slice(&msg.payload);

    let frame = Frame::new(MsgType::App, local_cpu_id, payload.freeze());
    match transport.send(&frame).await {
        // Forwarded APP traffic counts as "sent" for the liveness
        // machine's T_hb_send guard, same as a HEARTBEAT would.
        Ok(()) => peer.mark_sent(now),
        Err(err) => warn!(peer = %peer_id, error = %err, "forwarder transport send failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sb::{Command, SbError, SbEvent, SubEvent};
    use async_trait::async_trait;
    use sbn_core::identity::Mid;
    use sbn_core::peer::Peer;
    use std::collections::VecDeque;

    struct QueueBus {
        pipes: hashbrown::HashMap<u32, VecDeque<SbMessage>>,
    }

    #[async_trait]
    impl SoftwareBus for QueueBus {
        async fn publish(&mut self, _mid: Mid, _payload: Bytes) -> Result<(), SbError> {
            Ok(())
        }
        async fn poll_sub_event(&mut self) -> Option<SubEvent> {
            None
        }
        async fn poll_sb_event(&mut self) -> Option<SbEvent> {
            None
        }
        async fn poll_command(&mut self) -> Option<Command> {
            None
        }
        async fn poll_peer_pipe(&mut self, peer: CpuId) -> Option<SbMessage> {
            self.pipes.get_mut(&peer.get())?.pop_front()
        }
        async fn request_all_subs(&mut self) -> Result<(), SbError> {
            Ok(())
        }
    }

    struct RecordingTransport {
        sent: Vec<Frame>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn init(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
        async fn send(&mut self, frame: &Frame) -> sbn_wire::error::Result<()> {
            self.sent.push(frame.clone());
            Ok(())
        }
        async fn recv(&mut self) -> sbn_wire::error::Result<Option<Frame>> {
            Ok(None)
        }
        async fn shutdown(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
    }

    #[compio::test]
    async fn drops_messages_not_in_remote_subs() {
        let mut peer = Peer::new(CpuId::new(2), "B");
        peer.mark_received(1);
        let mut net = Net::new("udp0", vec![peer]);

        let mut pipes = hashbrown::HashMap::new();
        pipes.insert(
            2,
            VecDeque::from([SbMessage {
                mid: Mid::new(0x1821),
                payload: Bytes::from_static(b"nope"),
                origin_task: "OTHER_APP".to_string(),
            }]),
        );
        let mut bus = QueueBus { pipes };
        let mut transport = RecordingTransport { sent: Vec::new() };
        let remap = RemapTable::new();

        run_forwarder_pass(&mut net, CpuId::new(1), "SBN_APP", 1, &remap, &mut bus, &mut transport).await;
        assert!(transport.sent.is_empty());
    }

    #[compio::test]
    async fn forwards_messages_in_remote_subs() {
        let mut peer = Peer::new(CpuId::new(2), "B");
        peer.mark_received(1);
        peer.add_remote_sub(Mid::new(0x1820));
        let mut net = Net::new("udp0", vec![peer]);

        let mut pipes = hashbrown::HashMap::new();
        pipes.insert(
            2,
            VecDeque::from([SbMessage {
                mid: Mid::new(0x1820),
                payload: Bytes::from_static(b"HELLO"),
                origin_task: "OTHER_APP".to_string(),
            }]),
        );
        let mut bus = QueueBus { pipes };
        let mut transport = RecordingTransport { sent: Vec::new() };
        let remap = RemapTable::new();

        run_forwarder_pass(&mut net, CpuId::new(1), "SBN_APP", 1, &remap, &mut bus, &mut transport).await;
        assert_eq!(transport.sent.len(), 1);
        assert_eq!(transport.sent[0].msg_type, MsgType::App);
    }

    #[compio::test]
    async fn drops_messages_originating_from_sbn_itself() {
        let mut peer = Peer::new(CpuId::new(2), "B");
        peer.mark_received(1);
        peer.add_remote_sub(Mid::new(0x1820));
        let mut net = Net::new("udp0", vec![peer]);

        let mut pipes = hashbrown::HashMap::new();
        pipes.insert(
            2,
            VecDeque::from([SbMessage {
                mid: Mid::new(0x1820),
                payload: Bytes::from_static(b"HELLO"),
                origin_task: "SBN_APP".to_string(),
            }]),
        );
        let mut bus = QueueBus { pipes };
        let mut transport = RecordingTransport { sent: Vec::new() };
        let remap = RemapTable::new();

        run_forwarder_pass(&mut net, CpuId::new(1), "SBN_APP", 1, &remap, &mut bus, &mut transport).await;
        assert!(transport.sent.is_empty());
    }
}
