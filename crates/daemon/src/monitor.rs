// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource monitor: the 1-second health-check tick.
//!
//! For every task believed to be running, sample CPU%/MEM% and restart on
//! threshold overrun (with a warning datagram and an event-log line).
//! Dead processes transition to STOP; tasks whose desired cmd is START are
//! respawned. Any PID change is persisted before the tick ends.

use crate::event_log;
use crate::lifecycle::Daemon;
use crate::supervise;
use appctl_adapters::{ProcessAdapter, ResourceSampler, WarnKind, WarnNotifier, Warning};
use appctl_core::{Clock, DesiredCmd, Task, TaskStatus};
use std::path::Path;
use tracing::{info, warn};

/// Heartbeat trace cadence (unix seconds).
const TRACE_INTERVAL_SECS: i64 = 5;

pub(crate) fn tick<P, S, N, C>(daemon: &mut Daemon<P, S, N, C>)
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
        notifier,
        clock,
        container_id,
        last_trace,
    } = daemon;

    let now = clock.now();
    let ext_dir = config.ext_dir.clone();
    let mut changed = false;

    for task in store.table_mut().iter_mut() {
        if task.pid > 0 && process.is_alive(task.pid) {
            // Sampling errors read as 0% so a transient procfs hiccup
            // neither kills the app nor floods the logs.
            let (cpu, mem) = sampler.sample(&task.name, task.pid).unwrap_or((0, 0));

            if cpu > task.cpu_threshold {
                let threshold = task.cpu_threshold;
                overrun(
                    process, sampler, notifier, task, &ext_dir, now, container_id,
                    WarnKind::Cpu, cpu, threshold,
                );
                changed = true;
            } else if mem > task.mem_threshold {
                let threshold = task.mem_threshold;
                overrun(
                    process, sampler, notifier, task, &ext_dir, now, container_id,
                    WarnKind::Mem, mem, threshold,
                );
                changed = true;
            } else {
                task.status = TaskStatus::Running;
                task.cpu_rate = cpu;
                task.mem_rate = mem;
            }
            continue;
        }

        // Not alive (or never started)
        if task.is_running() {
            sampler.forget(task.pid);
            task.mark_stopped();
            changed = true;
        }

        if task.cmd == DesiredCmd::Start {
            match supervise::start_task(process, task, &ext_dir, now) {
                Ok(()) => {
                    event_log::append(task, now, "respawned by monitor");
                    info!(app = %task.name, pid = task.pid, "respawned");
                    changed = true;
                }
                Err(e) => warn!(app = %task.name, error = %e, "respawn failed"),
            }
        }
    }

    if changed {
        if let Err(e) = store.persist() {
            warn!(error = %e, "snapshot persist failed after tick");
        }
    }

    if now - *last_trace >= TRACE_INTERVAL_SECS {
        info!(apps = store.len(), "monitor ok");
        *last_trace = now;
    }
}

/// Restart a task that overran a threshold and emit the warning.
#[allow(clippy::too_many_arguments)]
fn overrun<P: ProcessAdapter, S: ResourceSampler, N: WarnNotifier>(
    process: &P,
    sampler: &mut S,
    notifier: &N,
    task: &mut Task,
    ext_dir: &Path,
    now: i64,
    container_id: &str,
    kind: WarnKind,
    value: u32,
    threshold: u32,
) {
    let what = match kind {
        WarnKind::Cpu => "cpu",
        WarnKind::Mem => "mem",
    };
    event_log::append(
        task,
        now,
        &format!("{} {}% over threshold {}%, restarting", what, value, threshold),
    );

    if let Err(e) = supervise::restart_task(process, sampler, task, ext_dir, now) {
        event_log::append(task, now, &format!("restart failed: {}", e));
        warn!(app = %task.name, error = %e, "restart after overrun failed");
    }

    task.cpu_rate = 0;
    task.mem_rate = 0;

    // Best-effort: the notifier logs and drops its own send errors
    notifier.warn(&Warning {
        cid: container_id.to_string(),
        name: task.name.clone(),
        kind,
        value,
        threshold,
    });
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
