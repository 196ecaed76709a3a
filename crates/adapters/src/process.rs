// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process lifecycle adapter.
//!
//! Spawns supervised applications, kills them, and answers liveness
//! queries. Every spawned child is reaped by a background task so it never
//! lingers as a zombie; the daemon does not kill its children on exit.

use appctl_core::AppError;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Base library search path prepended for every supervised process. The
/// app's private `lib/` directory is always appended, even when absent.
const LD_LIBRARY_PATH_BASE: &str = "/lib:/usr/lib:/home/zxlib";

/// Everything needed to spawn one supervised process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnSpec {
    /// Absolute path of the executable
    pub program: PathBuf,
    /// Single extra argv element (empty = none)
    pub param: String,
    /// Working directory (`<apps-ext>/<name>/bin/`)
    pub workdir: PathBuf,
    /// Private library directory (`<apps-ext>/<name>/lib`)
    pub lib_dir: PathBuf,
}

impl SpawnSpec {
    /// Compose the `LD_LIBRARY_PATH` for the child.
    pub fn library_path(&self) -> String {
        format!("{}:{}", LD_LIBRARY_PATH_BASE, self.lib_dir.display())
    }
}

/// OS seam for process lifecycle.
pub trait ProcessAdapter: Send + Sync {
    /// Spawn the process and return its PID. The child inherits the
    /// daemon's stdout/stderr and is reaped asynchronously.
    fn spawn(&self, spec: &SpawnSpec) -> Result<i32, AppError>;

    /// SIGKILL a PID. Killing an already-gone PID succeeds.
    fn kill(&self, pid: i32) -> Result<(), AppError>;

    /// Signal-0 liveness probe. PIDs 0..=2 are reserved and never alive.
    fn is_alive(&self, pid: i32) -> bool;
}

/// Real adapter backed by tokio::process and nix signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixProcessAdapter;

impl UnixProcessAdapter {
    pub fn new() -> Self {
        UnixProcessAdapter
    }
}

impl ProcessAdapter for UnixProcessAdapter {
    fn spawn(&self, spec: &SpawnSpec) -> Result<i32, AppError> {
        let mut cmd = Command::new(&spec.program);
        if !spec.param.is_empty() {
            cmd.arg(&spec.param);
        }
        cmd.current_dir(&spec.workdir)
            .env("LD_LIBRARY_PATH", spec.library_path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| AppError::Spawn(e.to_string()))?;
        let pid = child
            .id()
            .ok_or_else(|| AppError::Spawn("child exited before pid was read".to_string()))?
            as i32;

        debug!(program = %spec.program.display(), pid, "spawned");

        // Reap in the background so the child never becomes a zombie.
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => debug!(pid, %status, "child reaped"),
                Err(e) => warn!(pid, error = %e, "wait on child failed"),
            }
        });

        Ok(pid)
    }

    fn kill(&self, pid: i32) -> Result<(), AppError> {
        if pid <= 2 {
            return Ok(());
        }
        match kill(Pid::from_raw(pid), Signal::SIGKILL) {
            Ok(()) => Ok(()),
            // Already gone counts as stopped
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(AppError::Kill(e.to_string())),
        }
    }

    fn is_alive(&self, pid: i32) -> bool {
        // 0, 1, 2 are reserved for the system
        if pid <= 2 {
            return false;
        }
        kill(Pid::from_raw(pid), None).is_ok()
    }
}

/// Scripted adapter for tests: hands out sequential PIDs, tracks kills, and
/// can be told which PIDs look alive or to fail the next spawn.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeProcessAdapter {
    inner: std::sync::Arc<parking_lot::Mutex<FakeProcessInner>>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
struct FakeProcessInner {
    next_pid: i32,
    fail_spawn: bool,
    alive: std::collections::HashSet<i32>,
    spawned: Vec<SpawnSpec>,
    killed: Vec<i32>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeProcessAdapter {
    pub fn new() -> Self {
        let adapter = FakeProcessAdapter::default();
        adapter.inner.lock().next_pid = 1000;
        adapter
    }

    /// Make every subsequent spawn fail.
    pub fn fail_spawns(&self) {
        self.inner.lock().fail_spawn = true;
    }

    /// Mark a PID as dead without a kill.
    pub fn mark_dead(&self, pid: i32) {
        self.inner.lock().alive.remove(&pid);
    }

    pub fn spawned(&self) -> Vec<SpawnSpec> {
        self.inner.lock().spawned.clone()
    }

    pub fn killed(&self) -> Vec<i32> {
        self.inner.lock().killed.clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ProcessAdapter for FakeProcessAdapter {
    fn spawn(&self, spec: &SpawnSpec) -> Result<i32, AppError> {
        let mut inner = self.inner.lock();
        if inner.fail_spawn {
            return Err(AppError::Spawn("fake spawn failure".to_string()));
        }
        inner.next_pid += 1;
        let pid = inner.next_pid;
        inner.alive.insert(pid);
        inner.spawned.push(spec.clone());
        Ok(pid)
    }

    fn kill(&self, pid: i32) -> Result<(), AppError> {
        let mut inner = self.inner.lock();
        inner.alive.remove(&pid);
        inner.killed.push(pid);
        Ok(())
    }

    fn is_alive(&self, pid: i32) -> bool {
        if pid <= 2 {
            return false;
        }
        self.inner.lock().alive.contains(&pid)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
