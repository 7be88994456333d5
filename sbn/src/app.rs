//! `SbnApp`: the single owned process-wide aggregate.
//!
//! Created once at init and threaded by reference into `engine`,
//! `forwarder`, `bootstrap`, and `mainloop` — no ambient singleton.

use std::fmt;
use std::str::FromStr;

use sbn_core::clock::Clock;
use sbn_core::identity::{CpuId, Ident};
use sbn_core::liveness::Thresholds;
use sbn_core::mirror::SubscriptionMirror;
use sbn_core::net::Net;

use sbn_wire::remap::RemapTable;
use sbn_wire::transport::Transport;

use crate::sb::SoftwareBus;
use crate::tasks;

/// Whether the main loop drives receive/send inline each tick, or relies
/// on a dedicated per-net I/O task. Both modes produce identical
/// observable behavior modulo latency: [`NetHandle::tasked`] moves the
/// real transport onto its own task and hands the main loop a
/// [`tasks::TaskedTransport`] that speaks the same `Transport` seam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    Inline,
    Tasked,
}

impl FromStr for Concurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "tasked" => Ok(Self::Tasked),
            other => Err(format!("unknown concurrency mode: {other}")),
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => f.write_str("inline"),
            Self::Tasked => f.write_str("tasked"),
        }
    }
}

/// One configured net: its peer table, its transport, and the identity
/// under which this node speaks on it.
pub struct NetHandle {
    pub net: Net,
    pub transport: Box<dyn Transport>,
    /// The dedicated I/O task backing this net's transport, if it was
    /// built with [`NetHandle::tasked`]. Dropping it cancels the task;
    /// kept here purely so it isn't dropped the moment construction
    /// returns.
    pub io_task: Option<compio::runtime::JoinHandle<()>>,
}

impl NetHandle {
    /// Build a net whose transport the main loop drives directly, inline,
    /// each tick.
    #[must_use]
    pub fn inline(net: Net, transport: Box<dyn Transport>) -> Self {
        Self { net, transport, io_task: None }
    }

    /// Build a net whose transport is moved onto a dedicated I/O task; the
    /// main loop drives the returned [`tasks::TaskedTransport`] instead,
    /// through the same `Transport` trait.
    #[must_use]
    pub fn tasked(net: Net, transport: Box<dyn Transport>) -> Self {
        let (tasked_transport, io_task) = tasks::spawn_io_task(transport);
        Self { net, transport: Box::new(tasked_transport), io_task: Some(io_task) }
    }
}

/// The process-wide aggregate: every piece of mutable state SBN owns,
/// gathered in one place and threaded explicitly to each subsystem.
pub struct SbnApp {
    pub local_cpu_id: CpuId,
    pub local_ident: Ident,
    /// This node's own full task name, as the SB reports it alongside
    /// messages on the per-peer pipes. The Forwarder's self-filter drops
    /// any message whose origin matches this.
    pub local_task_name: String,
    pub thresholds: Thresholds,
    pub concurrency: Concurrency,
    pub nets: Vec<NetHandle>,
    pub local_subs: SubscriptionMirror,
    pub remap: RemapTable,
    pub bus: Box<dyn SoftwareBus>,
    pub clock: Box<dyn Clock>,
    pub running: bool,
}

impl SbnApp {
    #[must_use]
    pub fn new(
        local_cpu_id: CpuId,
        local_ident: Ident,
        local_task_name: impl Into<String>,
        thresholds: Thresholds,
        concurrency: Concurrency,
        nets: Vec<NetHandle>,
        remap: RemapTable,
        bus: Box<dyn SoftwareBus>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            local_cpu_id,
            local_ident,
            local_task_name: local_task_name.into(),
            thresholds,
            concurrency,
            nets,
            local_subs: SubscriptionMirror::new(),
            remap,
            bus,
            clock,
            running: true,
        }
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}
