// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-app event log.
//!
//! One append-only text file per installed app (`<apps-ext>/<name>/
//! event.log`) recording install, start/stop, restart and removal events.
//! Appends are best-effort: a broken log never fails a command.

use appctl_core::Task;
use std::io::Write;
use tracing::warn;

/// Append one line to the task's event log and bump `log_end_time`.
pub(crate) fn append(task: &mut Task, now: i64, message: &str) {
    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&task.log_file)
        .and_then(|mut file| writeln!(file, "{} {}", now, message));

    match result {
        Ok(()) => task.log_end_time = now,
        Err(e) => warn!(app = %task.name, error = %e, "event log append failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appctl_core::{TaskCfg, DEFAULT_THRESHOLD};

    #[test]
    fn append_writes_line_and_bumps_end_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = appctl_core::Task::installed(
            "foo",
            dir.path().join("bin/foo"),
            dir.path().join("event.log"),
            "SV01.001".to_string(),
            String::new(),
            TaskCfg {
                app_name: "foo".to_string(),
                bin_name: "foo".to_string(),
                lib_path: None,
            },
            (DEFAULT_THRESHOLD, DEFAULT_THRESHOLD),
            100,
        );

        append(&mut task, 200, "started pid 42");
        append(&mut task, 300, "stopped");

        assert_eq!(task.log_end_time, 300);
        assert!(task.log_end_time >= task.log_start_time);

        let content = std::fs::read_to_string(&task.log_file).unwrap();
        assert_eq!(content, "200 started pid 42\n300 stopped\n");
    }

    #[test]
    fn unwritable_log_leaves_end_time_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut task = appctl_core::Task::installed(
            "foo",
            dir.path().join("bin/foo"),
            dir.path().join("no-such-dir/event.log"),
            "SV01.001".to_string(),
            String::new(),
            TaskCfg {
                app_name: "foo".to_string(),
                bin_name: "foo".to_string(),
                lib_path: None,
            },
            (DEFAULT_THRESHOLD, DEFAULT_THRESHOLD),
            100,
        );

        append(&mut task, 200, "whatever");
        assert_eq!(task.log_end_time, 100);
    }
}
