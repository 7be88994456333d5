//! The `SoftwareBus` trait: the boundary to the external Software Bus
//! collaborator.
//!
//! SBN never implements a message bus itself — the SB, its pipes, and its
//! event channel are supplied by the hosting environment. This trait is
//! the seam a real flight-software integration fills with its own SB
//! bindings, and a test fills with an in-memory double.

use async_trait::async_trait;
use bytes::Bytes;

use sbn_core::identity::{Mid, QosHint};

/// One message snooped from, or destined for, the local Software Bus.
///
/// `origin_task` is the full name of the task that originally published
/// it, as the SB reports it alongside the message. The Forwarder uses
/// this to drop messages SBN itself just republished, rather than
/// send them straight back out.
#[derive(Debug, Clone)]
pub struct SbMessage {
    pub mid: Mid,
    pub payload: Bytes,
    pub origin_task: String,
}

/// A subscription change snooped from the SB's "all-subs"/"one-sub"
/// broadcast channels.
#[derive(Debug, Clone, Copy)]
pub enum SubEvent {
    Subscribe(Mid, QosHint),
    Unsubscribe(Mid),
}

/// A lifecycle event snooped from the SB's own event channel, watched by
/// bootstrap for the `INIT` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbEvent {
    Init,
    Other,
}

/// A ground command delivered on the command pipe alongside the
/// scheduler's wakeup tick.
#[derive(Debug, Clone)]
pub enum Command {
    Noop,
    Shutdown,
    ResetPeer(sbn_core::identity::CpuId),
}

/// The external Software Bus collaborator.
///
/// Implementations supply the command pipe, subscription snoop pipe,
/// per-peer pipes, and publish path this node's SB exposes. SBN's own
/// code never blocks indefinitely on any of these: every method
/// here is expected to return promptly, `Ok(None)` meaning "nothing
/// available right now".
#[async_trait]
pub trait SoftwareBus: Send {
    /// Republish an inbound `APP` payload locally. Implementations must
    /// not increment the source sequence counter and must avoid copying
    /// the payload where the SB's API allows a zero-copy hand-off.
    async fn publish(&mut self, mid: Mid, payload: Bytes) -> Result<(), SbError>;

    /// Drain one pending subscription snoop event, if any.
    async fn poll_sub_event(&mut self) -> Option<SubEvent>;

    /// Drain one pending SB lifecycle event, if any (used by bootstrap to
    /// watch for `INIT`).
    async fn poll_sb_event(&mut self) -> Option<SbEvent>;

    /// Drain one pending ground command or scheduler tick, if any.
    async fn poll_command(&mut self) -> Option<Command>;

    /// Drain the next locally-published message destined for `peer`'s
    /// per-peer pipe, if any.
    async fn poll_peer_pipe(&mut self, peer: sbn_core::identity::CpuId) -> Option<SbMessage>;

    /// Send a "give me all current subscriptions" request, as bootstrap's
    /// step 2 requires.
    async fn request_all_subs(&mut self) -> Result<(), SbError>;
}

/// Failure modes a `SoftwareBus` implementation can report. SBN logs and
/// absorbs these per the error taxonomy; it never retries a publish on
/// its own.
#[derive(Debug, thiserror::Error)]
pub enum SbError {
    #[error("software bus publish failed: {0}")]
    PublishFailed(String),

    #[error("software bus pipe unavailable: {0}")]
    PipeUnavailable(String),
}

/// A `SoftwareBus` that never has anything pending and accepts every
/// publish silently.
///
/// This is a placeholder for environments wiring up the binary without a
/// real SB integration yet (e.g. running the protocol engine standalone
/// against another SBN instance for transport-layer testing). Production
/// deployments supply a real binding to the host SB implementation.
#[derive(Debug, Default)]
pub struct NullSoftwareBus;

#[async_trait]
impl SoftwareBus for NullSoftwareBus {
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

    async fn poll_peer_pipe(&mut self, _peer: sbn_core::identity::CpuId) -> Option<SbMessage> {
        None
    }

    async fn request_all_subs(&mut self) -> Result<(), SbError> {
        Ok(())
    }
}
