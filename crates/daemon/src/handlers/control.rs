// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutating task commands: START, STOP, ENABLE/DISABLE, RM, CONFIG_*.

use crate::event_log;
use crate::lifecycle::Daemon;
use crate::protocol::{
    ControlReply, ControlRequest, RESULT_FAILED, RESULT_SUCCESS, RESULT_VERIFY_FAILED,
};
use appctl_adapters::{verify_executable, PackageTree, Verdict};
use appctl_adapters::{ProcessAdapter, ResourceSampler, WarnNotifier};
use appctl_core::task::valid_percent;
use appctl_core::{Clock, CtlCommand, DesiredCmd};
use crate::supervise;
use tracing::{info, warn};

pub(crate) fn handle_start<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let Daemon {
        config,
        store,
        process,
        clock,
        ..
    } = daemon;
    let name = request.name.as_str();

    let Some(task) = store.find_mut(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };

    // The executable is re-verified on every start: a binary swapped on
    // disk after install must not come up.
    let tree = PackageTree::installed(&config.ext_dir, name);
    let verdict = tree
        .signature()
        .and_then(|sig| verify_executable(&task.path, &sig));
    match verdict {
        Ok(Verdict::Verified) => {}
        Ok(Verdict::Mismatch) | Err(_) => {
            return ControlReply::failed(request.cmd, name, RESULT_VERIFY_FAILED);
        }
    }

    if !process.is_alive(task.pid) {
        let now = clock.now();
        if let Err(e) = supervise::start_task(process, task, &config.ext_dir, now) {
            warn!(app = name, error = %e, "start failed");
            return ControlReply::failed(request.cmd, name, RESULT_FAILED);
        }
        event_log::append(task, now, "started");
        info!(app = name, pid = task.pid, "started");
    }
    task.cmd = DesiredCmd::Start;

    if let Err(e) = store.persist() {
        warn!(error = %e, "snapshot persist failed after start");
    }
    ControlReply::ok(request.cmd, name, RESULT_SUCCESS)
}

pub(crate) fn handle_stop<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let Daemon {
        store,
        process,
        sampler,
        clock,
        ..
    } = daemon;
    let name = request.name.as_str();

    let Some(task) = store.find_mut(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };

    if let Err(e) = supervise::stop_task(process, sampler, task) {
        warn!(app = name, error = %e, "stop failed");
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    }
    event_log::append(task, clock.now(), "stopped");
    info!(app = name, "stopped");

    if let Err(e) = store.persist() {
        warn!(error = %e, "snapshot persist failed after stop");
    }
    ControlReply::ok(request.cmd, name, RESULT_SUCCESS)
}

/// ENABLE / DISABLE: metadata-only change, no effect on a live process.
pub(crate) fn handle_enable<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
    enable: u8,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let name = request.name.as_str();
    let Some(task) = daemon.store.find_mut(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };
    task.enable = enable;

    if let Err(e) = daemon.store.persist() {
        warn!(error = %e, "snapshot persist failed after enable change");
    }
    ControlReply::ok(request.cmd, name, RESULT_SUCCESS)
}

pub(crate) fn handle_rm<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let Daemon {
        config,
        store,
        process,
        sampler,
        ..
    } = daemon;
    let name = request.name.as_str();

    let Some(task) = store.find(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };

    if task.is_running() {
        let pid = task.pid;
        if let Err(e) = process.kill(pid) {
            warn!(app = name, pid, error = %e, "kill during rm failed");
        }
        sampler.forget(pid);
    }

    let tree = PackageTree::installed(&config.ext_dir, name);
    if let Err(e) = tree.remove() {
        warn!(app = name, error = %e, "tree removal failed");
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    }

    store.remove(name);
    if let Err(e) = store.persist() {
        warn!(error = %e, "snapshot persist failed after rm");
    }
    info!(app = name, "removed");
    ControlReply::ok(request.cmd, name, RESULT_SUCCESS)
}

/// CONFIG_*: update one per-task percent field.
pub(crate) fn handle_config<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let name = request.name.as_str();
    if !valid_percent(request.value as i64) {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    }
    let value = request.value as u32;

    let Some(task) = daemon.store.find_mut(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };
    match request.cmd {
        CtlCommand::ConfigCpuThreshold => task.cpu_threshold = value,
        CtlCommand::ConfigMemThreshold => task.mem_threshold = value,
        CtlCommand::ConfigCpuLimit => task.cpu_limit = value,
        CtlCommand::ConfigMemLimit => task.mem_limit = value,
        _ => return ControlReply::failed(request.cmd, name, RESULT_FAILED),
    }

    if let Err(e) = daemon.store.persist() {
        warn!(error = %e, "snapshot persist failed after config change");
    }
    ControlReply::ok(request.cmd, name, RESULT_SUCCESS)
}
