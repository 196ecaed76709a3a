// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use appctl_adapters::{
    ProcSampler, ProcessAdapter, ResourceSampler, UdpWarnNotifier, UnixProcessAdapter,
    WarnNotifier,
};
use appctl_core::{container_id, Clock, SystemClock};
use appctl_storage::{SnapshotError, TaskStore};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixDatagram;
use tracing::{info, warn};

use crate::env;
use crate::handlers;
use crate::monitor;
use crate::protocol::{ControlReply, ControlRequest};

/// Daemon version string answered to `VERSION container`.
pub const DAEMON_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Drop-in directory for inbound `.tar` packages
    pub apps_dir: PathBuf,
    /// Extraction root for installed app trees
    pub ext_dir: PathBuf,
    /// Holds `monitor.cfg`, the lock file and the daemon log
    pub state_dir: PathBuf,
    /// Datagram control endpoint
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// UDP warning collector endpoint
    pub warn_addr: String,
    /// Source of the container id
    pub hostname_file: PathBuf,
    /// Monitor tick interval
    pub tick: Duration,
}

impl Config {
    /// Load configuration from the environment (production defaults).
    pub fn load() -> Self {
        let state_dir = env::state_dir();
        Config {
            apps_dir: env::apps_dir(),
            ext_dir: env::ext_dir(),
            socket_path: env::socket_path(),
            lock_path: state_dir.join("appctl-daemon.pid"),
            log_path: state_dir.join("appctl-daemon.log"),
            warn_addr: env::warn_addr(),
            hostname_file: env::hostname_file(),
            tick: env::tick_interval(),
            state_dir,
        }
    }
}

/// The daemon aggregate: every piece of mutable state, constructed once at
/// startup and threaded through the handlers and the monitor. There is no
/// module-level state anywhere in the crate.
pub struct Daemon<P, S, N, C> {
    pub config: Config,
    pub store: TaskStore,
    pub process: P,
    pub sampler: S,
    pub notifier: N,
    pub clock: C,
    /// Contents of the hostname file, stamped into warnings
    pub container_id: String,
    /// Unix second of the last monitor heartbeat trace
    pub last_trace: i64,
}

/// Production daemon with concrete adapter types.
pub type ProdDaemon = Daemon<UnixProcessAdapter, ProcSampler, UdpWarnNotifier, SystemClock>;

impl<P, S, N, C> Daemon<P, S, N, C>
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    /// Handle one decoded request, producing the reply stream for it.
    pub fn handle_request(&mut self, request: &ControlRequest) -> Vec<ControlReply> {
        handlers::dispatch(self, request)
    }

    /// One monitor tick.
    pub fn tick(&mut self) {
        monitor::tick(self);
    }
}

/// Daemon state during operation.
///
/// The socket is returned separately from startup: the listener task owns
/// the receive side, the engine loop owns the send side.
pub struct StartupResult {
    pub daemon: ProdDaemon,
    pub socket: Arc<UnixDatagram>,
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    pub lock_file: File,
}

impl std::fmt::Debug for StartupResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupResult").finish_non_exhaustive()
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config) {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock —
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create the working directories
    std::fs::create_dir_all(&config.state_dir)?;
    create_dir_with_mode(&config.apps_dir, 0o755)?;
    std::fs::create_dir_all(&config.ext_dir)?;

    // 2. Acquire the lock file FIRST - prevents races.
    // OpenOptions avoids truncating before we hold the lock, which would
    // wipe the running daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file (truncate now that we hold the lock)
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // 3. Container identity, read once
    let container_id = match container_id(&config.hostname_file) {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "container id unavailable, warnings will carry an empty cid");
            String::new()
        }
    };

    // 4. Reload the persisted task table
    let mut store = TaskStore::new(&config.state_dir, &config.ext_dir);
    store.load()?;
    info!("Recovered task table: {} apps", store.len());

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let socket = UnixDatagram::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    let daemon = Daemon {
        config: config.clone(),
        store,
        process: UnixProcessAdapter::new(),
        sampler: ProcSampler::new(),
        notifier: UdpWarnNotifier::new(&config.warn_addr),
        clock: SystemClock,
        container_id,
        last_trace: 0,
    };

    info!("Daemon started");

    Ok(StartupResult {
        daemon,
        socket: Arc::new(socket),
        lock_file,
    })
}

impl<P, S, N, C> Daemon<P, S, N, C> {
    /// Shutdown the daemon gracefully.
    ///
    /// Supervised children are deliberately left running: on the next
    /// startup the reloaded table respawns anything with `cmd = START`.
    pub fn shutdown(&mut self) {
        info!("Shutting down daemon...");

        if let Err(e) = self.store.persist() {
            warn!("Failed to persist final snapshot: {}", e);
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
    }
}

/// Create a directory with an explicit mode when it does not exist yet.
fn create_dir_with_mode(path: &std::path::Path, mode: u32) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}


#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
