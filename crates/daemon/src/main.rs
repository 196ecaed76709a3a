// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! appctl supervisor daemon
//!
//! Background process that owns the task table and keeps supervised
//! applications alive.
//!
//! Architecture:
//! - Listener task: blocks on the datagram socket, decodes requests,
//!   queues them for the engine loop
//! - Engine loop: main task, selects between queued commands and the
//!   1-second monitor tick; sole mutator of all daemon state

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod event_log;
mod handlers;
mod lifecycle;
mod listener;
mod monitor;
mod protocol;
mod supervise;

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::lifecycle::{Config, LifecycleError, StartupResult, DAEMON_VERSION};
use crate::listener::{Listener, REQUEST_QUEUE_CAPACITY};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("appctl-daemon {}", DAEMON_VERSION);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("appctl-daemon {}", DAEMON_VERSION);
                println!("On-device application supervisor daemon");
                println!();
                println!("USAGE:");
                println!("    appctl-daemon");
                println!();
                println!("The daemon listens on a local datagram socket for commands from");
                println!("the appctl CLI, supervises installed applications, and restarts");
                println!("them on resource overruns.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: appctl-daemon [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load();

    // Rotate log file if it has grown too large
    rotate_log_if_needed(&config.log_path);

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!("Starting appctl daemon");

    let StartupResult {
        mut daemon,
        socket,
        lock_file: _lock_file,
    } = match lifecycle::startup(&config) {
        Ok(result) => result,
        Err(LifecycleError::LockFailed(_)) => {
            // Another daemon is already running — print a human-readable
            // message instead of a raw debug error.
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("appctl-daemon is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            // Bind (or other startup) failure exits nonzero
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    // Spawn the socket reader
    let (tx, mut rx) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
    tokio::spawn(Listener::new(Arc::clone(&socket), tx).run());

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Monitor tick. NOTE: must be created outside the loop - select!
    // re-evaluates branches each iteration, so a sleep() inside would
    // reset on every command. A slow handler (install decompressing a
    // large archive) delays the tick rather than bursting catch-up ticks.
    let mut tick = tokio::time::interval(config.tick);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // Engine loop - sole mutator of the task table
    loop {
        tokio::select! {
            maybe_request = rx.recv() => {
                match maybe_request {
                    Some(client_request) => {
                        let replies = daemon.handle_request(&client_request.request);
                        for reply in replies {
                            let bytes = match protocol::encode(&reply) {
                                Ok(bytes) => bytes,
                                Err(e) => {
                                    error!("reply encode failed: {}", e);
                                    continue;
                                }
                            };
                            if let Err(e) = socket.send_to(&bytes, &client_request.client).await {
                                warn!(
                                    client = %client_request.client.display(),
                                    error = %e,
                                    "reply send failed"
                                );
                                break;
                            }
                        }
                    }
                    None => {
                        // Socket reader hit an error and dropped the sender
                        info!("Request queue closed, shutting down...");
                        break;
                    }
                }
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }

            // Health-check tick
            _ = tick.tick() => {
                daemon.tick();
            }
        }
    }

    daemon.shutdown();
    info!("Daemon stopped");
    Ok(())
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep.
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `appctl-daemon.log` → `.log.1` → `.log.2` → `.log.3`, deleting
/// the oldest. Best-effort: rotation failures are silently ignored so the
/// daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    // Shift older rotations: .3 is deleted, .2→.3, .1→.2
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Rotate current log → .1
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Rotation happens at startup via rotate_log_if_needed
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or("log path has no parent")?,
        config.log_path.file_name().ok_or("log path has no file name")?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
