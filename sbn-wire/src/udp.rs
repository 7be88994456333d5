//! UDP transport: the common case for SBN nets within a single LAN
//! segment.
//!
//! Connectionless, so the liveness state machine in `sbn-core` carries
//! the entire burden of knowing whether a peer is actually there — this
//! transport just moves datagrams and never blocks waiting for one.

use async_trait::async_trait;
use compio::buf::IoBuf;
use compio::net::UdpSocket;
use tracing::{debug, trace, warn};

use crate::config::BufferConfig;
use crate::error::{Result, WireError};
use crate::frame::Frame;
use crate::transport::Transport;

/// One peer-to-peer-or-broadcast UDP endpoint.
pub struct UdpTransport {
    bind_addr: String,
    peer_addr: Option<String>,
    config: BufferConfig,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    #[must_use]
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            peer_addr: None,
            config: BufferConfig::default(),
            socket: None,
        }
    }

    /// Fix the destination for `send`; without this, `send` targets
    /// whatever address was last received from (matching SBN's original
    /// "reply to sender" UDP behavior when peer addresses aren't
    /// statically configured).
    #[must_use]
    pub fn with_peer(mut self, peer_addr: impl Into<String>) -> Self {
        self.peer_addr = Some(peer_addr.into());
        self
    }

    #[must_use]
    pub fn with_buffer_config(mut self, config: BufferConfig) -> Self {
        self.config = config;
        self
    }

    fn socket_mut(&mut self) -> Result<&mut UdpSocket> {
        self.socket.as_mut().ok_or(WireError::NotInitialized)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn init(&mut self) -> Result<()> {
        let socket = UdpSocket::bind(&self.bind_addr).await?;
        debug!(bind_addr = %self.bind_addr, "udp transport bound");
        self.socket = Some(socket);
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        let encoded = frame.encode()?;
        let dest = self
            .peer_addr
            .clone()
            .ok_or(WireError::NotInitialized)?;
        let socket = self.socket_mut()?;
        let (result, _buf) = socket.send_to(encoded, &dest).await;
        result?;
        trace!(dest = %dest, msg_type = ?frame.msg_type, "udp frame sent");
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>> {
        let buf = vec![0u8; self.config.read_buf_size];
        let socket = self.socket_mut()?;
        let (result, buf) = socket.recv_from(buf).await;
        match result {
            Ok((n, _from)) => match Frame::decode(&buf.as_slice()[..n]) {
                Ok(frame) => Ok(Some(frame)),
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "dropping malformed udp frame");
                    Ok(None)
                }
                Err(err) => Err(err),
            },
            Err(err) => Err(WireError::Io(err)),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.socket = None;
        Ok(())
    }
}
