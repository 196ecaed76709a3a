// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

use crate::lifecycle::test_support::{test_daemon, TestDaemon};
use crate::protocol::{
    result_file_not_exist, ControlReply, CODE_NOT_FOUND, CODE_OK, RESULT_DECOMPRESS_FAILED,
    RESULT_FAILED, RESULT_FINISH, RESULT_SUCCESS, RESULT_VERIFY_FAILED,
};
use appctl_adapters::test_support::PackageBuilder;
use appctl_core::{Clock, Task, TaskCfg, TaskStatus};

mod control;
mod install;
mod query;

/// Executable payload used across handler tests.
const BIN: &[u8] = b"#!/bin/sh\nwhile true; do sleep 1; done\n";

/// Run a request expected to produce exactly one reply.
fn dispatch_one(daemon: &mut TestDaemon, request: &ControlRequest) -> ControlReply {
    let mut replies = dispatch(daemon, request);
    assert_eq!(replies.len(), 1, "expected a single reply");
    replies.remove(0)
}

/// Fresh daemon with one valid package `foo.tar` dropped into its apps dir.
fn daemon_with_package(dir: &std::path::Path) -> TestDaemon {
    let daemon = test_daemon(dir);
    PackageBuilder::new("foo", BIN)
        .write_to(&daemon.config.apps_dir)
        .unwrap();
    daemon
}

/// Daemon with `foo` fully installed through the INSTALL handler.
fn installed_daemon(dir: &std::path::Path) -> TestDaemon {
    let mut daemon = daemon_with_package(dir);
    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, CODE_OK);
    daemon
}

/// Register a task without going through a package (for list/query tests).
fn insert_bare_task(daemon: &mut TestDaemon, name: &str) {
    let app_dir = daemon.config.ext_dir.join(name);
    std::fs::create_dir_all(app_dir.join("bin")).unwrap();

    let task = Task::installed(
        name,
        app_dir.join("bin").join(name),
        app_dir.join("event.log"),
        "SV01.001".to_string(),
        "0123456789abcdef0123456789abcdef".to_string(),
        TaskCfg {
            app_name: name.to_string(),
            bin_name: name.to_string(),
            lib_path: None,
        },
        daemon.store.defaults(),
        daemon.clock.now(),
    );
    daemon.store.insert(task).unwrap();
}
