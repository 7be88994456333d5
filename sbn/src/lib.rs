//! # SBN — Software Bus Network bridge
//!
//! A resident application that extends a local publish/subscribe
//! Software Bus across processor boundaries by forwarding messages to
//! peer processors over one or more network transports.
//!
//! ## Architecture
//!
//! - **`sbn-core`**: transport-agnostic protocol kernel — peer/net data
//!   model, the subscription mirror, the liveness state machine. No I/O.
//! - **`sbn-wire`**: the wire frame codec and the `Transport` capability
//!   (`UDP`/`TCP`, built on `compio`).
//! - **`sbn`** (this crate): the resident application — config loading,
//!   bootstrap, the protocol engine's drive loop, the forwarder, the
//!   main loop, and the binary entry point.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use sbn::app::{Concurrency, NetHandle, SbnApp};
//! use sbn_core::clock::SystemClock;
//! use sbn_core::identity::{CpuId, Ident};
//! use sbn_core::liveness::Thresholds;
//! use sbn_core::net::Net;
//! use sbn_core::peer::Peer;
//! use sbn_wire::remap::RemapTable;
//! use sbn_wire::transport::Transport;
//! use sbn_wire::udp::UdpTransport;
//!
//! # async fn example(bus: Box<dyn sbn::sb::SoftwareBus>) -> sbn_wire::error::Result<()> {
//! let mut transport = UdpTransport::new("0.0.0.0:4000").with_peer("10.0.0.2:4000");
//! transport.init().await?;
//!
//! let net = Net::new("udp0", vec![Peer::new(CpuId::new(2), "Bravo")]);
//! let mut app = SbnApp::new(
//!     CpuId::new(1),
//!     Ident::new("SBN-v1"),
//!     "SBN_APP",
//!     Thresholds { t_announce: 10, t_hb_send: 20, t_hb_timeout: 30 },
//!     Concurrency::Inline,
//!     vec![NetHandle::inline(net, Box::new(transport))],
//!     RemapTable::new(),
//!     bus,
//!     Box::new(SystemClock::new()),
//! );
//!
//! sbn::mainloop::run(&mut app, Duration::from_millis(200)).await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::future_not_send)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod bootstrap;
pub mod command;
pub mod config;
pub mod dev_tracing;
pub mod engine;
pub mod forwarder;
pub mod mainloop;
pub mod sb;
pub mod tasks;

/// Re-exports for convenient downstream imports.
pub mod prelude {
    pub use crate::app::{Concurrency, NetHandle, SbnApp};
    pub use crate::sb::{Command, SbError, SbEvent, SbMessage, SoftwareBus, SubEvent};
}
