//! Bootstrap: synchronize with the local SB's readiness before the
//! protocol engine starts subscribing peers.
//!
//! The local SB may not have finished initializing when SBN starts. This
//! module resolves that hazard by polling for a subscription response
//! while watching for the SB's own `INIT` event in parallel.

use tracing::{debug, info};

use crate::sb::{SbEvent, SoftwareBus};

/// Resend the "give me all current subscriptions" request every this many
/// polls while waiting.
pub const RESEND_EVERY_N_POLLS: u64 = 100;

/// Outcome of [`wait_for_sb_startup`].
///
/// `Resend` is the only variant ever produced, on every exit path,
/// including the one that looks like it should mean "a subscription
/// response arrived, no resend needed". That branch is unreachable in
/// practice given how the SB reports readiness; the behavior is kept
/// as-is rather than "fixed".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    Resend,
}

/// Run the bootstrap loop against `bus`, polling up to `max_polls` times
/// (tests bound this; the resident app passes effectively unbounded and
/// relies on the `INIT` event or the first subscription response to end
/// it).
pub async fn wait_for_sb_startup(
    bus: &mut dyn SoftwareBus,
    max_polls: u64,
) -> StartupOutcome {
    bus.request_all_subs().await.ok();

    for poll in 0..max_polls {
        if poll > 0 && poll % RESEND_EVERY_N_POLLS == 0 {
            debug!(poll, "bootstrap resending subscription request");
            bus.request_all_subs().await.ok();
        }

        if let Some(SbEvent::Init) = bus.poll_sb_event().await {
            info!("observed SB INIT event during bootstrap, exiting and resending");
            return StartupOutcome::Resend;
        }

        if bus.poll_sub_event().await.is_some() {
            // A subscription response arrived, but we still signal
            // "resend needed" here rather than treat it as settled.
            return StartupOutcome::Resend;
        }
    }

    StartupOutcome::Resend
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sb::{Command, SbError, SbMessage, SubEvent};
    use async_trait::async_trait;
    use bytes::Bytes;
    use sbn_core::identity::{CpuId, Mid};

    struct FakeBus {
        init_at_poll: Option<u64>,
        polls: u64,
        requests_sent: u32,
    }

    #[async_trait]
    impl SoftwareBus for FakeBus {
        async fn publish(&mut self, _mid: Mid, _payload: Bytes) -> Result<(), SbError> {
            Ok(())
        }

        async fn poll_sub_event(&mut self) -> Option<SubEvent> {
            None
        }

        async fn poll_sb_event(&mut self) -> Option<SbEvent> {
            self.polls += 1;
            if self.init_at_poll == Some(self.polls) {
                Some(SbEvent::Init)
            } else {
                None
            }
        }

        async fn poll_command(&mut self) -> Option<Command> {
            None
        }

        async fn poll_peer_pipe(&mut self, _peer: CpuId) -> Option<SbMessage> {
            None
        }

        async fn request_all_subs(&mut self) -> Result<(), SbError> {
            self.requests_sent += 1;
            Ok(())
        }
    }

    #[compio::test]
    async fn always_signals_resend_even_when_sub_response_arrives_first() {
        struct RespondsImmediately;

        #[async_trait]
        impl SoftwareBus for RespondsImmediately {
            async fn publish(&mut self, _mid: Mid, _payload: Bytes) -> Result<(), SbError> {
                Ok(())
            }
            async fn poll_sub_event(&mut self) -> Option<SubEvent> {
                Some(SubEvent::Subscribe(Mid::new(1), Default::default()))
            }
            async fn poll_sb_event(&mut self) -> Option<SbEvent> {
                None
            }
            async fn poll_command(&mut self) -> Option<Command> {
                None
            }
            async fn poll_peer_pipe(&mut self, _peer: CpuId) -> Option<SbMessage> {
                None
            }
            async fn request_all_subs(&mut self) -> Result<(), SbError> {
                Ok(())
            }
        }

        let mut bus = RespondsImmediately;
        let outcome = wait_for_sb_startup(&mut bus, 10).await;
        assert_eq!(outcome, StartupOutcome::Resend);
    }

    #[compio::test]
    async fn resends_after_observing_init_event() {
        let mut bus = FakeBus {
            init_at_poll: Some(3),
            polls: 0,
            requests_sent: 0,
        };
        let outcome = wait_for_sb_startup(&mut bus, 10).await;
        assert_eq!(outcome, StartupOutcome::Resend);
        assert!(bus.requests_sent >= 1);
    }

    #[compio::test]
    async fn resends_periodically_while_waiting() {
        let mut bus = FakeBus {
            init_at_poll: None,
            polls: 0,
            requests_sent: 0,
        };
        wait_for_sb_startup(&mut bus, (RESEND_EVERY_N_POLLS * 2) + 1).await;
        assert!(bus.requests_sent >= 2);
    }
}
