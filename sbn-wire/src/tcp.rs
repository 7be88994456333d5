//! TCP transport: for nets that need the OS to handle windowing and
//! span a link UDP's MTU behavior makes unreliable.
//!
//! SBN imposes no ordering or delivery guarantees of its own (see
//! Non-goals), so a TCP net gets nothing more than "the existing channel
//! trusted to deliver bytes in order" — peer loss is still governed
//! entirely by the heartbeat timeout in `sbn-core`, not by TCP's own
//! connection state, so a half-open socket is detected the same way a
//! dead UDP peer is.

use async_trait::async_trait;
use compio::net::{TcpListener, TcpStream};
use tracing::{debug, trace, warn};

use crate::buffer::SegmentedBuffer;
use crate::config::BufferConfig;
use crate::error::{Result, WireError};
use crate::frame::Frame;
use crate::transport::Transport;

/// A length-prefixed-frame TCP transport. One side listens, the other
/// connects; which one is decided by the module configuration, not by
/// this type.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    listener: Option<TcpListener>,
    connect_addr: Option<String>,
    listen_addr: Option<String>,
    config: BufferConfig,
    staging: SegmentedBuffer,
}

impl TcpTransport {
    #[must_use]
    pub fn connecting_to(addr: impl Into<String>) -> Self {
        Self {
            stream: None,
            listener: None,
            connect_addr: Some(addr.into()),
            listen_addr: None,
            config: BufferConfig::default(),
            staging: SegmentedBuffer::new(),
        }
    }

    #[must_use]
    pub fn listening_on(addr: impl Into<String>) -> Self {
        Self {
            stream: None,
            listener: None,
            connect_addr: None,
            listen_addr: Some(addr.into()),
            config: BufferConfig::default(),
            staging: SegmentedBuffer::new(),
        }
    }

    #[must_use]
    pub fn with_buffer_config(mut self, config: BufferConfig) -> Self {
        self.config = config;
        self
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(WireError::NotInitialized)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn init(&mut self) -> Result<()> {
        if let Some(addr) = &self.connect_addr {
            let stream = TcpStream::connect(addr).await?;
            debug!(addr = %addr, "tcp transport connected");
            self.stream = Some(stream);
            return Ok(());
        }
        if let Some(addr) = &self.listen_addr {
            let listener = TcpListener::bind(addr).await?;
            let (stream, peer) = listener.accept().await?;
            debug!(addr = %addr, peer = %peer, "tcp transport accepted connection");
            self.listener = Some(listener);
            self.stream = Some(stream);
            return Ok(());
        }
        Err(WireError::NotInitialized)
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        let encoded = frame.encode()?;
        let stream = self.stream_mut()?;
        let (result, _buf) = stream.write_all(encoded).await;
        result?;
        trace!(msg_type = ?frame.msg_type, "tcp frame sent");
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>> {
        if let Some(bytes) = self.staging.take_frame() {
            return match Frame::decode(&bytes) {
                Ok(frame) => Ok(Some(frame)),
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "dropping malformed tcp frame");
                    Ok(None)
                }
                Err(err) => Err(err),
            };
        }

        let buf = vec![0u8; self.config.read_buf_size];
        let stream = self.stream_mut()?;
        let (result, buf) = stream.read(buf).await;
        let n = result?;
        if n == 0 {
            return Err(WireError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "tcp peer closed the connection",
            )));
        }
        self.staging.push(bytes::Bytes::copy_from_slice(&buf[..n]));

        match self.staging.take_frame() {
            Some(bytes) => match Frame::decode(&bytes) {
                Ok(frame) => Ok(Some(frame)),
                Err(err) if err.is_recoverable() => {
                    warn!(error = %err, "dropping malformed tcp frame");
                    Ok(None)
                }
                Err(err) => Err(err),
            },
            None => Ok(None),
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stream = None;
        self.listener = None;
        Ok(())
    }
}
