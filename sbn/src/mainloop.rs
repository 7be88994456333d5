//! The tick-driven main loop.
//!
//! Blocks on the command pipe with timeout `T_tick`. Whether a command
//! arrives, the timeout fires, or nothing is pending, one protocol cycle
//! runs regardless: liveness tick over every Net, inbound frame receive,
//! subscription snoop service, and a forwarder pass. Only unexpected
//! failures exit the loop; a `Shutdown` ground command is the cooperative
//! exit path.
//!
//! Every step drives `handle.transport` through the `Transport` trait
//! alone, so it runs identically whether that net is `Inline` (the real
//! transport) or `Tasked` (a [`crate::tasks::TaskedTransport`] backed by
//! channels to a dedicated I/O task) — the loop body never branches on
//! [`crate::app::Concurrency`].

use std::time::Duration;

use tracing::{debug, trace};

use sbn_core::identity::QosHint;
use sbn_core::mirror::MirrorChange;

use crate::app::{Concurrency, SbnApp};
use crate::command::{self, CommandOutcome};
use crate::engine;
use crate::forwarder;
use crate::sb::{Command, SbMessage, SubEvent};

/// One full protocol cycle across every configured net, at the given
/// tick timestamp.
pub async fn run_cycle(app: &mut SbnApp, now: u64) {
    service_sub_pipe(app).await;

    for handle in &mut app.nets {
        engine::run_liveness_tick(
            &mut handle.net,
            now,
            &app.thresholds,
            &app.local_ident,
            app.local_cpu_id,
            &mut *handle.transport,
        )
        .await;

        while let Ok(Some(frame)) = handle.transport.recv().await {
            engine::dispatch_inbound(
                &mut handle.net,
                frame,
                now,
                app.local_cpu_id,
                &app.local_ident,
                &app.local_subs,
                &mut *handle.transport,
                &mut *app.bus,
            )
            .await;
        }

        forwarder::run_forwarder_pass(
            &mut handle.net,
            app.local_cpu_id,
            &app.local_task_name,
            now,
            &app.remap,
            &mut *app.bus,
            &mut *handle.transport,
        )
        .await;
    }
}

/// Snoop the SB's subscription broadcast channels and propagate any
/// change to every `Heartbeating` peer across every net.
async fn service_sub_pipe(app: &mut SbnApp) {
    while let Some(event) = app.bus.poll_sub_event().await {
        let (mid, qos, change) = match event {
            SubEvent::Subscribe(mid, qos) => (mid, qos, app.local_subs.subscribe(mid, qos)),
            SubEvent::Unsubscribe(mid) => (mid, QosHint::default(), app.local_subs.unsubscribe(mid)),
        };

        if matches!(change, MirrorChange::Unchanged) {
            continue;
        }

        let msg_type = match change {
            MirrorChange::Added => sbn_wire::frame::MsgType::Subscribe,
            MirrorChange::Removed => sbn_wire::frame::MsgType::Unsubscribe,
            MirrorChange::Unchanged => unreachable!(),
        };
        let payload = engine::encode_sub_record(mid, qos);

        for handle in &mut app.nets {
            for peer in handle.net.peers_mut().iter_mut().filter(|p| p.is_heartbeating()) {
                let frame = sbn_wire::frame::Frame::new(msg_type, app.local_cpu_id, payload.clone());
                if let Err(err) = handle.transport.send(&frame).await {
                    tracing::warn!(peer = %peer.processor_id(), error = %err, "failed to propagate subscription change");
                } else {
                    peer.mark_sent(app.now());
                }
            }
        }
    }
}

/// Drive the main loop until a `Shutdown` command is received or the
/// command pipe reports a failure. `tick_timeout` bounds how long each
/// iteration waits on the command pipe before running a cycle anyway.
pub async fn run(app: &mut SbnApp, tick_timeout: Duration) {
    while app.running {
        let command = compio::time::timeout(tick_timeout, app.bus.poll_command())
            .await
            .ok()
            .flatten();

        if let Some(command) = command {
            trace!(?command, "processing ground command");
            let outcome = apply_to_every_net(app, command);
            if outcome == CommandOutcome::Shutdown {
                app.running = false;
                debug!("main loop exiting on shutdown command");
                break;
            }
        }

        let now = app.now();
        run_cycle(app, now).await;
    }
}

fn apply_to_every_net(app: &mut SbnApp, command: Command) -> CommandOutcome {
    let mut outcome = CommandOutcome::Continue;
    for handle in &mut app.nets {
        if command::apply(&mut handle.net, command.clone()) == CommandOutcome::Shutdown {
            outcome = CommandOutcome::Shutdown;
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::NetHandle;
    use crate::sb::{SbError, SbEvent};
    use async_trait::async_trait;
    use bytes::Bytes;
    use sbn_core::clock::VirtualClock;
    use sbn_core::identity::{CpuId, Mid};
    use sbn_core::liveness::Thresholds;
    use sbn_core::net::Net;
    use sbn_core::peer::Peer;
    use sbn_wire::frame::{Frame, MsgType};
    use sbn_wire::remap::RemapTable;
    use sbn_wire::transport::Transport;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct NullTransport;

    #[async_trait]
    impl Transport for NullTransport {
        async fn init(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
        async fn send(&mut self, _frame: &Frame) -> sbn_wire::error::Result<()> {
            Ok(())
        }
        async fn recv(&mut self) -> sbn_wire::error::Result<Option<Frame>> {
            Ok(None)
        }
        async fn shutdown(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
    }

    struct ScriptedBus {
        sub_events: VecDeque<SubEvent>,
        commands: VecDeque<Command>,
    }

    #[async_trait]
    impl crate::sb::SoftwareBus for ScriptedBus {
        async fn publish(&mut self, _mid: Mid, _payload: Bytes) -> Result<(), SbError> {
            Ok(())
        }
        async fn poll_sub_event(&mut self) -> Option<SubEvent> {
            self.sub_events.pop_front()
        }
        async fn poll_sb_event(&mut self) -> Option<SbEvent> {
            None
        }
        async fn poll_command(&mut self) -> Option<Command> {
            self.commands.pop_front()
        }
        async fn poll_peer_pipe(&mut self, _peer: CpuId) -> Option<SbMessage> {
            None
        }
        async fn request_all_subs(&mut self) -> Result<(), SbError> {
            Ok(())
        }
    }

    #[compio::test]
    async fn shutdown_command_stops_the_main_loop() {
        let mut app = SbnApp::new(
            CpuId::new(1),
            sbn_core::identity::Ident::new("SBN-vX"),
            "SBN_APP",
            Thresholds {
                t_announce: 10,
                t_hb_send: 20,
                t_hb_timeout: 30,
            },
            Concurrency::Inline,
            vec![NetHandle::inline(
                Net::new("udp0", vec![Peer::new(CpuId::new(2), "B")]),
                Box::new(NullTransport),
            )],
            RemapTable::new(),
            Box::new(ScriptedBus {
                sub_events: VecDeque::new(),
                commands: VecDeque::from([Command::Shutdown]),
            }),
            Box::new(VirtualClock::new()),
        );

        run(&mut app, Duration::from_millis(1)).await;
        assert!(!app.running);
    }

    struct ScriptedTransport {
        to_deliver: Mutex<VecDeque<Frame>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn init(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
        async fn send(&mut self, _frame: &Frame) -> sbn_wire::error::Result<()> {
            Ok(())
        }
        async fn recv(&mut self) -> sbn_wire::error::Result<Option<Frame>> {
            Ok(self.to_deliver.lock().unwrap().pop_front())
        }
        async fn shutdown(&mut self) -> sbn_wire::error::Result<()> {
            Ok(())
        }
    }

    #[compio::test]
    async fn tasked_net_receives_and_dispatches_like_an_inline_one() {
        let frame = Frame::new(MsgType::Announce, CpuId::new(2), Bytes::from_static(b"SBN-vX"));
        let transport = ScriptedTransport { to_deliver: Mutex::new(VecDeque::from([frame])) };

        let mut app = SbnApp::new(
            CpuId::new(1),
            sbn_core::identity::Ident::new("SBN-vX"),
            "SBN_APP",
            Thresholds {
                t_announce: 10,
                t_hb_send: 20,
                t_hb_timeout: 30,
            },
            Concurrency::Tasked,
            vec![NetHandle::tasked(
                Net::new("udp0", vec![Peer::new(CpuId::new(2), "B")]),
                Box::new(transport),
            )],
            RemapTable::new(),
            Box::new(ScriptedBus {
                sub_events: VecDeque::new(),
                commands: VecDeque::new(),
            }),
            Box::new(VirtualClock::new()),
        );

        // Give the dedicated I/O task a chance to pull the queued frame
        // across its channel before the cycle's recv drain runs.
        compio::time::sleep(Duration::from_millis(20)).await;
        run_cycle(&mut app, 11).await;

        assert!(app.nets[0].net.find(CpuId::new(2)).unwrap().is_heartbeating());
    }
}
