//! Wire-level error type.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireError>;

/// Errors produced while encoding, decoding, or moving bytes over a
/// [`crate::transport::Transport`].
#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame too large: {0} bytes exceeds SBN_MAX_PAYLOAD")]
    FrameTooLarge(usize),

    #[error("truncated frame: expected at least {expected} bytes, got {got}")]
    Truncated { expected: usize, got: usize },

    #[error("unknown message type byte: {0}")]
    UnknownMsgType(u8),

    #[error("ident string exceeds SBN_IDENT_LEN ({0} bytes)")]
    IdentTooLong(usize),

    #[error("transport not initialized")]
    NotInitialized,

    #[error("transport io error: {0}")]
    Io(#[from] io::Error),
}

impl WireError {
    /// Whether the caller should treat this as recoverable at the
    /// per-frame level (skip and continue) versus fatal to the transport
    /// (frame-level and config-level errors recover; I/O and init
    /// failures do not).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FrameTooLarge(_)
                | Self::Truncated { .. }
                | Self::UnknownMsgType(_)
                | Self::IdentTooLong(_)
        )
    }
}
