//! Shared test doubles for the scenario tests: an in-memory `Transport`
//! connecting two simulated nodes, and a `SoftwareBus` double with
//! inspectable queues.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use flume::{Receiver, Sender};

use sbn_core::identity::{CpuId, Mid};
use sbn_wire::error::Result as WireResult;
use sbn_wire::frame::Frame;
use sbn_wire::transport::Transport;

use sbn::sb::{Command, SbError, SbEvent, SbMessage, SoftwareBus, SubEvent};

/// A transport backed by an unbounded `flume` channel pair, simulating
/// a lossless connectionless link between two nodes in a test.
pub struct ChannelTransport {
    tx: Sender<Frame>,
    rx: Receiver<Frame>,
}

/// Build a pair of `ChannelTransport`s wired to each other.
pub fn channel_pair() -> (ChannelTransport, ChannelTransport) {
    let (tx_a, rx_a) = flume::unbounded();
    let (tx_b, rx_b) = flume::unbounded();
    (
        ChannelTransport { tx: tx_a, rx: rx_b },
        ChannelTransport { tx: tx_b, rx: rx_a },
    )
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn init(&mut self) -> WireResult<()> {
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> WireResult<()> {
        let _ = self.tx.send(frame.clone());
        Ok(())
    }

    async fn recv(&mut self) -> WireResult<Option<Frame>> {
        Ok(self.rx.try_recv().ok())
    }

    async fn shutdown(&mut self) -> WireResult<()> {
        Ok(())
    }
}

/// A `SoftwareBus` double with queues the test can push into and drain
/// from directly, standing in for real SB pipes.
#[derive(Default)]
pub struct TestBus {
    pub published: Vec<(Mid, Bytes)>,
    pub sub_events: VecDeque<SubEvent>,
    pub sb_events: VecDeque<SbEvent>,
    pub commands: VecDeque<Command>,
    pub peer_pipes: hashbrown::HashMap<u32, VecDeque<SbMessage>>,
}

impl TestBus {
    /// Queue a message as if `origin_task` had just published it locally.
    pub fn push_to_peer_pipe_from(&mut self, peer: CpuId, mid: Mid, payload: &'static [u8], origin_task: &str) {
        self.peer_pipes.entry(peer.get()).or_default().push_back(SbMessage {
            mid,
            payload: Bytes::from_static(payload),
            origin_task: origin_task.to_string(),
        });
    }

    /// Convenience wrapper for the common case: a message from some other
    /// app, not from SBN itself.
    pub fn push_to_peer_pipe(&mut self, peer: CpuId, mid: Mid, payload: &'static [u8]) {
        self.push_to_peer_pipe_from(peer, mid, payload, "OTHER_APP");
    }
}

#[async_trait]
impl SoftwareBus for TestBus {
    async fn publish(&mut self, mid: Mid, payload: Bytes) -> Result<(), SbError> {
        self.published.push((mid, payload));
        Ok(())
    }

    async fn poll_sub_event(&mut self) -> Option<SubEvent> {
        self.sub_events.pop_front()
    }

    async fn poll_sb_event(&mut self) -> Option<SbEvent> {
        self.sb_events.pop_front()
    }

    async fn poll_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    async fn poll_peer_pipe(&mut self, peer: CpuId) -> Option<SbMessage> {
        self.peer_pipes.get_mut(&peer.get())?.pop_front()
    }

    async fn request_all_subs(&mut self) -> Result<(), SbError> {
        Ok(())
    }
}
