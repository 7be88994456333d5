//! Resident binary entry point.
//!
//! Loads the peer and module configuration files named on the command
//! line, builds one `Net`/`Transport` pair per configured net, runs
//! bootstrap, then drives the main loop until a shutdown command or an
//! unrecoverable init error.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;
use std::time::Duration;

use tracing::error;

use std::str::FromStr;

use sbn::app::{Concurrency, NetHandle, SbnApp};
use sbn::config::{self, ModuleRecord, PeerRecord};
use sbn::sb::NullSoftwareBus;
use sbn_core::clock::SystemClock;
use sbn_core::identity::{CpuId, Ident};
use sbn_core::liveness::Thresholds;
use sbn_core::net::Net;
use sbn_core::peer::Peer;
use sbn_wire::remap::RemapTable;
use sbn_wire::tcp::TcpTransport;
use sbn_wire::transport::Transport;
use sbn_wire::udp::UdpTransport;

/// `RUN` / `EXIT_NORMAL` / `EXIT_ERROR`, mapped onto `ExitCode` for the
/// hosting environment's run-status contract.
fn main() -> ExitCode {
    sbn::dev_tracing::init_tracing();

    compio::runtime::Runtime::new()
        .expect("failed to start compio runtime")
        .block_on(async_main())
}

async fn async_main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let (Some(peer_file), Some(module_file), local_cpu_id) = parse_args(&args) else {
        eprintln!("usage: sbn <local-cpu-id> <peer-config-file> <module-config-file>");
        return ExitCode::FAILURE;
    };

    let peer_text = match std::fs::read_to_string(&peer_file) {
        Ok(text) => text,
        Err(err) => {
            error!(file = %peer_file, error = %err, "failed to read peer configuration");
            return ExitCode::FAILURE;
        }
    };
    let module_text = match std::fs::read_to_string(&module_file) {
        Ok(text) => text,
        Err(err) => {
            error!(file = %module_file, error = %err, "failed to read module configuration");
            return ExitCode::FAILURE;
        }
    };

    let peer_records: Vec<PeerRecord> = match config::parse_records(&peer_text) {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "malformed peer configuration");
            return ExitCode::FAILURE;
        }
    };
    let module_records: Vec<ModuleRecord> = match config::parse_records(&module_text) {
        Ok(records) => records,
        Err(err) => {
            error!(error = %err, "malformed module configuration");
            return ExitCode::FAILURE;
        }
    };

    let concurrency = env::var("SBN_CONCURRENCY")
        .ok()
        .map(|raw| Concurrency::from_str(&raw).unwrap_or_else(|err| {
            error!(value = %raw, error = %err, "ignoring unrecognized SBN_CONCURRENCY, defaulting to inline");
            Concurrency::Inline
        }))
        .unwrap_or(Concurrency::Inline);

    let nets = match build_nets(&peer_records, &module_records, local_cpu_id, concurrency).await {
        Ok(nets) => nets,
        Err(err) => {
            error!(error = %err, "fatal configuration error during init");
            return ExitCode::FAILURE;
        }
    };

    let local_task_name = env::var("SBN_TASK_NAME").unwrap_or_else(|_| "SBN_APP".to_string());

    let mut app = SbnApp::new(
        local_cpu_id,
        Ident::new("SBN-v1"),
        local_task_name,
        Thresholds {
            t_announce: 10,
            t_hb_send: 20,
            t_hb_timeout: 30,
        },
        concurrency,
        nets,
        RemapTable::new(),
        Box::new(NullSoftwareBus),
        Box::new(SystemClock::new()),
    );

    sbn::bootstrap::wait_for_sb_startup(&mut *app.bus, u64::MAX).await;

    sbn::mainloop::run(&mut app, Duration::from_millis(200)).await;

    ExitCode::SUCCESS
}

fn parse_args(args: &[String]) -> (Option<String>, Option<String>, CpuId) {
    if args.len() < 4 {
        return (None, None, CpuId::new(0));
    }
    let local_cpu_id = args[1].parse().unwrap_or(0);
    (
        Some(args[2].clone()),
        Some(args[3].clone()),
        CpuId::new(local_cpu_id),
    )
}

async fn build_nets(
    peer_records: &[PeerRecord],
    module_records: &[ModuleRecord],
    local_cpu_id: CpuId,
    concurrency: Concurrency,
) -> Result<Vec<NetHandle>, String> {
    let mut peers_by_net: HashMap<&str, Vec<Peer>> = HashMap::new();
    for record in peer_records {
        if record.cpu_id == local_cpu_id {
            continue;
        }
        peers_by_net
            .entry(record.net_id.as_str())
            .or_default()
            .push(Peer::new(record.cpu_id, record.name.clone()));
    }

    let mut nets = Vec::with_capacity(module_records.len());
    for module in module_records {
        let peers = peers_by_net.remove(module.net_id.as_str()).unwrap_or_default();
        let net = Net::new(module.net_id.clone(), peers);

        let mut transport = build_transport(module)?;
        transport
            .init()
            .await
            .map_err(|err| format!("net {}: transport init failed: {err}", module.net_id))?;

        nets.push(match concurrency {
            Concurrency::Inline => NetHandle::inline(net, transport),
            Concurrency::Tasked => NetHandle::tasked(net, transport),
        });
    }

    Ok(nets)
}

fn build_transport(module: &ModuleRecord) -> Result<Box<dyn Transport>, String> {
    match module.transport_name.as_str() {
        "udp" => Ok(Box::new(UdpTransport::new(module.options.clone()))),
        "tcp-connect" => Ok(Box::new(TcpTransport::connecting_to(module.options.clone()))),
        "tcp-listen" => Ok(Box::new(TcpTransport::listening_on(module.options.clone()))),
        other => Err(format!("unknown transport module: {other}")),
    }
}
