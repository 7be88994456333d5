//! SBN Core
//!
//! Transport-agnostic protocol kernel for the Software Bus Network bridge:
//! - Node/peer identity and the per-net peer table (`peer`, `net`)
//! - The subscription mirror: local subs + per-peer remote subs (`mirror`)
//! - The liveness state machine, a pure function of peer state + clock (`liveness`)
//! - A monotonic clock abstraction so tests can drive virtual time (`clock`)
//! - Housekeeping counters (`housekeeping`)
//!
//! This crate's own data structures are infallible by construction (peer
//! lookup returns `Option`, subscription bookkeeping is idempotent); the
//! fallible seams — wire decode, config parsing, SB interaction — each own
//! their error type one layer up, in `sbn-wire` and `sbn`.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod clock;
pub mod housekeeping;
pub mod identity;
pub mod liveness;
pub mod mirror;
pub mod net;
pub mod peer;

/// A small prelude to make downstream crates ergonomic.
pub mod prelude {
    pub use crate::clock::{Clock, SystemClock, VirtualClock};
    pub use crate::housekeeping::PeerCounters;
    pub use crate::identity::{CpuId, Ident, Mid, QosHint};
    pub use crate::liveness::{evaluate, LivenessAction, Thresholds};
    pub use crate::mirror::SubscriptionMirror;
    pub use crate::net::Net;
    pub use crate::peer::{Peer, PeerState};
}
