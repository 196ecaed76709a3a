// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use appctl_core::DesiredCmd;
use yare::parameterized;

#[test]
fn start_unknown_task_spawns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "nope"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_FAILED);
    assert!(daemon.process.spawned().is_empty());
}

#[test]
fn start_spawns_and_sets_desire() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, RESULT_SUCCESS);

    let task = daemon.store.find("foo").unwrap();
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.cmd, DesiredCmd::Start);
    assert!(task.pid > 2);
    assert!(task.start_time > 0);

    // Spawned from the app's bin directory
    let spawned = daemon.process.spawned();
    assert_eq!(spawned.len(), 1);
    assert_eq!(spawned[0].workdir, daemon.config.ext_dir.join("foo/bin"));
}

#[test]
fn start_while_alive_does_not_respawn() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    let pid = daemon.store.find("foo").unwrap().pid;

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(daemon.store.find("foo").unwrap().pid, pid);
    assert_eq!(daemon.process.spawned().len(), 1);
}

#[test]
fn start_rejects_a_swapped_binary() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    // Binary replaced on disk after install; signature no longer matches
    std::fs::write(daemon.config.ext_dir.join("foo/bin/foo"), b"evil").unwrap();

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_VERIFY_FAILED);
    assert!(daemon.process.spawned().is_empty());
}

#[test]
fn start_spawn_failure_reports_failed() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());
    daemon.process.fail_spawns();

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_FAILED);
    // Desired cmd untouched on spawn failure
    assert_eq!(daemon.store.find("foo").unwrap().cmd, DesiredCmd::Stop);
}

#[test]
fn stop_kills_and_clears_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());
    dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    let pid = daemon.store.find("foo").unwrap().pid;

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Stop, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, RESULT_SUCCESS);

    let task = daemon.store.find("foo").unwrap();
    assert_eq!(task.status, TaskStatus::Stop);
    assert_eq!(task.cmd, DesiredCmd::Stop);
    assert_eq!(task.pid, 0);
    assert_eq!(daemon.process.killed(), vec![pid]);
}

#[test]
fn stop_of_dead_process_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());
    dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    let pid = daemon.store.find("foo").unwrap().pid;
    daemon.process.mark_dead(pid);

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Stop, "foo"));
    assert_eq!(reply.code, CODE_OK);
}

#[test]
fn stop_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Stop, "nope"));
    assert_eq!(reply.code, 1);
}

#[test]
fn enable_and_disable_flip_the_flag_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Disable, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(daemon.store.find("foo").unwrap().enable, 0);
    // No process side effect
    assert!(daemon.process.spawned().is_empty());
    assert!(daemon.process.killed().is_empty());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Enable, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(daemon.store.find("foo").unwrap().enable, 1);

    assert!(daemon.config.state_dir.join("monitor.cfg").exists());
}

#[test]
fn enable_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Enable, "nope"));
    assert_eq!(reply.code, 1);
}

#[test]
fn rm_kills_removes_tree_and_forgets_task() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());
    dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Start, "foo"));
    let pid = daemon.store.find("foo").unwrap().pid;

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Rm, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, RESULT_SUCCESS);

    assert!(daemon.store.is_empty());
    assert!(!daemon.config.ext_dir.join("foo").exists());
    assert!(daemon.process.killed().contains(&pid));
}

#[test]
fn rm_of_stopped_task_removes_without_kill() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Rm, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert!(daemon.process.killed().is_empty());
}

#[test]
fn rm_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Rm, "nope"));
    assert_eq!(reply.code, 1);
}

#[parameterized(
    cpu_threshold = { CtlCommand::ConfigCpuThreshold },
    mem_threshold = { CtlCommand::ConfigMemThreshold },
    cpu_limit = { CtlCommand::ConfigCpuLimit },
    mem_limit = { CtlCommand::ConfigMemLimit },
)]
fn config_updates_the_field(cmd: CtlCommand) {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::with_value(cmd, "foo", 55));
    assert_eq!(reply.code, CODE_OK);

    let task = daemon.store.find("foo").unwrap();
    let value = match cmd {
        CtlCommand::ConfigCpuThreshold => task.cpu_threshold,
        CtlCommand::ConfigMemThreshold => task.mem_threshold,
        CtlCommand::ConfigCpuLimit => task.cpu_limit,
        CtlCommand::ConfigMemLimit => task.mem_limit,
        _ => unreachable!(),
    };
    assert_eq!(value, 55);
}

#[parameterized(
    over = { 101 },
    negative = { -1 },
)]
fn config_rejects_out_of_range_percent(value: i32) {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::with_value(CtlCommand::ConfigCpuThreshold, "foo", value),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(daemon.store.find("foo").unwrap().cpu_threshold, 90);
}

#[test]
fn config_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::with_value(CtlCommand::ConfigCpuThreshold, "nope", 50),
    );
    assert_eq!(reply.code, 1);
}
