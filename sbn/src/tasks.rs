//! The dedicated per-net I/O task backing [`crate::app::Concurrency::Tasked`].
//!
//! When a net is configured `Tasked`, its real [`Transport`] is moved onto
//! one task that owns it exclusively and multiplexes `recv`/`send` with
//! `futures::select!`. The main loop never touches that transport again —
//! it drives [`TaskedTransport`] instead, which implements `Transport`
//! itself by pushing onto an outbound channel and popping off an inbound
//! one. `engine`, `forwarder`, and `mainloop` see the same `dyn Transport`
//! seam either way and don't need to know which mode a net is running in.

use async_trait::async_trait;
use flume::{Receiver, Sender};
use futures::FutureExt;
use tracing::warn;

use sbn_wire::error::{Result, WireError};
use sbn_wire::frame::Frame;
use sbn_wire::transport::Transport;

/// The main loop's handle to a `Tasked` net's transport.
///
/// `send` hands the frame to the I/O task over a channel instead of
/// calling the real transport directly; `recv` drains whatever the I/O
/// task has decoded so far. Both are non-blocking with respect to the
/// underlying medium, same as an inline transport's contract requires.
pub struct TaskedTransport {
    outbound: Sender<Frame>,
    inbound: Receiver<Frame>,
}

#[async_trait]
impl Transport for TaskedTransport {
    async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        self.outbound
            .send_async(frame.clone())
            .await
            .map_err(|_| WireError::NotInitialized)
    }

    async fn recv(&mut self) -> Result<Option<Frame>> {
        Ok(self.inbound.try_recv().ok())
    }

    async fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Move `transport` onto a dedicated task and return the `TaskedTransport`
/// handle the main loop drives in its place, plus the task's join handle
/// (kept alive by the caller so the task isn't silently dropped and
/// cancelled).
pub fn spawn_io_task(mut transport: Box<dyn Transport>) -> (TaskedTransport, compio::runtime::JoinHandle<()>) {
    let (inbound_tx, inbound_rx) = flume::unbounded();
    let (outbound_tx, outbound_rx) = flume::unbounded();

    let handle = compio::runtime::spawn(async move {
        loop {
            futures::select! {
                recv_result = transport.recv().fuse() => {
                    match recv_result {
                        Ok(Some(frame)) => {
                            if inbound_tx.send_async(frame).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(err) if err.is_recoverable() => {
                            warn!(error = %err, "net task dropping malformed frame");
                        }
                        Err(err) => {
                            warn!(error = %err, "net task exiting on fatal transport error");
                            break;
                        }
                    }
                }
                frame = outbound_rx.recv_async().fuse() => {
                    match frame {
                        Ok(frame) => {
                            if let Err(err) = transport.send(&frame).await {
                                warn!(error = %err, "net task transport send failed");
                            }
                        }
                        Err(_) => break,
                    }
                }
            }
        }
    });

    (
        TaskedTransport {
            outbound: outbound_tx,
            inbound: inbound_rx,
        },
        handle,
    )
}
