// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process manager: start, stop and restart of supervised tasks.
//!
//! Shared by the command handlers and the monitor tick. These helpers
//! mutate only the task record; persistence and event-log writes stay
//! with the caller.

use appctl_adapters::{ProcessAdapter, ResourceSampler, SpawnSpec};
use appctl_core::{AppError, DesiredCmd, Task};
use std::path::Path;

/// Spawn parameters for a task: run from the app's `bin/` directory with
/// its private `lib/` appended to the library path.
pub(crate) fn spawn_spec(task: &Task, ext_dir: &Path) -> SpawnSpec {
    let app_root = ext_dir.join(&task.name);
    SpawnSpec {
        program: task.path.clone(),
        param: task.param.clone(),
        workdir: app_root.join("bin"),
        lib_dir: app_root.join("lib"),
    }
}

/// Spawn the task's process and record the observation.
///
/// On spawn failure the task's desired cmd is left untouched; the caller
/// (or the next monitor tick) decides whether to retry.
pub(crate) fn start_task<P: ProcessAdapter>(
    process: &P,
    task: &mut Task,
    ext_dir: &Path,
    now: i64,
) -> Result<(), AppError> {
    let spec = spawn_spec(task, ext_dir);
    let pid = process.spawn(&spec)?;
    task.mark_started(pid, now);
    Ok(())
}

/// SIGKILL the task's process and record it stopped.
///
/// A PID that is already gone counts as success.
pub(crate) fn stop_task<P: ProcessAdapter, S: ResourceSampler>(
    process: &P,
    sampler: &mut S,
    task: &mut Task,
) -> Result<(), AppError> {
    let pid = task.pid;
    process.kill(pid)?;
    sampler.forget(pid);
    task.mark_stopped();
    task.cmd = DesiredCmd::Stop;
    Ok(())
}

/// Stop then start, keeping the desired cmd at START.
pub(crate) fn restart_task<P: ProcessAdapter, S: ResourceSampler>(
    process: &P,
    sampler: &mut S,
    task: &mut Task,
    ext_dir: &Path,
    now: i64,
) -> Result<(), AppError> {
    stop_task(process, sampler, task)?;
    task.cmd = DesiredCmd::Start;
    start_task(process, task, ext_dir, now)
}

#[cfg(test)]
#[path = "supervise_tests.rs"]
mod tests;
