//! The transport capability: the polymorphic replacement for dynamically
//! loaded, per-net transport modules.
//!
//! Each configured `Net` owns one `Box<dyn Transport>`, resolved once at
//! init from the module configuration file's declared transport name. SBN
//! ships [`crate::udp::UdpTransport`] and [`crate::tcp::TcpTransport`];
//! an integrator adds another physical medium (serial, SpaceWire, a test
//! double) by implementing this trait, not by writing a `.so` and a
//! lookup table.

use async_trait::async_trait;

use crate::error::Result;
use crate::frame::Frame;

/// A physical or logical medium capable of moving SBN frames between
/// this node and its peers.
///
/// Implementations are expected to be non-blocking with respect to the
/// caller's runtime: `recv` returns promptly with `Ok(None)` rather than
/// blocking when nothing is ready, so it composes with a
/// `WaitForWakeup`-driven tick loop (SBN never blocks indefinitely on
/// the network when the host scheduler has other work to do).
#[async_trait]
pub trait Transport: Send + Sync {
    /// One-time setup: bind sockets, open devices, whatever the medium
    /// needs before frames can move.
    async fn init(&mut self) -> Result<()>;

    /// Send one frame. Transports are free to batch or coalesce at their
    /// discretion as long as frame boundaries are preserved for the
    /// receiver.
    async fn send(&mut self, frame: &Frame) -> Result<()>;

    /// Attempt to receive the next available frame without blocking. A
    /// return of `Ok(None)` means no frame is currently available, not an
    /// error — the caller moves on within the same tick.
    async fn recv(&mut self) -> Result<Option<Frame>>;

    /// Release any held resources. Best-effort; failures here don't
    /// reopen already-declared-lost peers.
    async fn shutdown(&mut self) -> Result<()>;
}
