//! Transport buffer sizing.
//!
//! Distinct from the peer/module configuration files the `sbn` crate
//! loads at init — this module only tunes socket buffer sizes, and is
//! consumed entirely within [`crate::udp`] and [`crate::tcp`].

/// Default read buffer size (8KB), sized for typical SB telemetry and
/// command messages.
pub const DEFAULT_READ_BUF_SIZE: usize = 8192;

/// Default write buffer size (8KB).
pub const DEFAULT_WRITE_BUF_SIZE: usize = 8192;

/// Small buffer size (4KB), for nets carrying only small command/telemetry
/// traffic.
pub const SMALL_BUF_SIZE: usize = 4096;

/// Large buffer size (32KB), for nets that forward bulk science or file
/// data close to `SBN_MAX_PAYLOAD`.
pub const LARGE_BUF_SIZE: usize = 32768;

/// Per-net transport buffer configuration.
#[derive(Debug, Clone, Copy)]
pub struct BufferConfig {
    pub read_buf_size: usize,
    pub write_buf_size: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            read_buf_size: DEFAULT_READ_BUF_SIZE,
            write_buf_size: DEFAULT_WRITE_BUF_SIZE,
        }
    }
}

impl BufferConfig {
    #[must_use]
    pub const fn small() -> Self {
        Self {
            read_buf_size: SMALL_BUF_SIZE,
            write_buf_size: SMALL_BUF_SIZE,
        }
    }

    #[must_use]
    pub const fn large() -> Self {
        Self {
            read_buf_size: LARGE_BUF_SIZE,
            write_buf_size: LARGE_BUF_SIZE,
        }
    }

    #[must_use]
    pub const fn custom(read_buf_size: usize, write_buf_size: usize) -> Self {
        Self {
            read_buf_size,
            write_buf_size,
        }
    }
}
