//! # SBN Wire
//!
//! **Internal wire-format and transport crate for SBN.**
//!
//! This crate owns everything that touches bytes on the network:
//!
//! - [`frame`] — the `SBN` wire frame (`MsgSize`, `MsgType`, `CpuID`,
//!   payload) and its encode/decode.
//! - [`remap`] — the optional ingress `MessageId` remap table.
//! - [`transport`] — the `Transport` capability trait (`init`/`send`/
//!   `recv`/`shutdown`) that replaces ad-hoc dynamically loaded transport
//!   modules with a polymorphic, statically-dispatched registry.
//! - [`udp`] / [`tcp`] — `compio`-based transport implementations.
//!
//! Protocol logic (the liveness state machine, the subscription mirror) is
//! intentionally *not* here — it lives in `sbn-core`, sans-IO and testable
//! without any socket.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffer;
pub mod config;
pub mod error;
pub mod frame;
pub mod remap;
pub mod tcp;
pub mod transport;
pub mod udp;

/// Prelude module for convenient imports.
///
/// ```rust
/// use sbn_wire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, WireError};
    pub use crate::frame::{Frame, MsgType, SBN_IDENT_LEN, SBN_MAX_PAYLOAD};
    pub use crate::remap::RemapTable;
    pub use crate::transport::Transport;
}
