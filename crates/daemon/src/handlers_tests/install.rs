// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use appctl_core::DesiredCmd;

#[test]
fn install_registers_a_verified_package() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = daemon_with_package(dir.path());

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, RESULT_SUCCESS);

    let task = daemon.store.find("foo").unwrap();
    assert_eq!(task.status, TaskStatus::Install);
    assert_eq!(task.cmd, DesiredCmd::Stop);
    assert_eq!(task.enable, 1);
    assert_eq!(task.version, "SV01.001");
    assert_eq!(task.cpu_threshold, 90);
    assert_eq!(task.mem_threshold, 90);
    assert_eq!(task.hash.len(), 32);
    assert!(task.log_start_time > 0);

    // Extracted tree in place
    let bin = daemon.config.ext_dir.join("foo/bin/foo");
    assert!(bin.is_file());
    assert_eq!(task.path, bin);

    // Hash is the executable's MD5
    assert_eq!(task.hash, appctl_adapters::md5_hex(&bin).unwrap());

    // Event log primed and table persisted
    assert!(task.log_file.is_file());
    assert!(daemon.config.state_dir.join("monitor.cfg").exists());
}

#[test]
fn install_missing_package_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "nope.tar"),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, result_file_not_exist("nope.tar"));
    assert!(daemon.store.is_empty());
}

#[test]
fn install_undecompressable_package() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    std::fs::write(daemon.config.apps_dir.join("foo.tar"), b"not a tarball").unwrap();

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_DECOMPRESS_FAILED);
    assert!(daemon.store.is_empty());
}

#[test]
fn install_tampered_package_is_rejected_and_cleaned_up() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    // Signature covers different bytes than the shipped executable
    PackageBuilder::new("foo", BIN)
        .sign_as(b"some other executable")
        .write_to(&daemon.config.apps_dir)
        .unwrap();

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_VERIFY_FAILED);

    // Never half-installed: no task, no tree
    assert!(daemon.store.is_empty());
    assert!(!daemon.config.ext_dir.join("foo").exists());
}

#[test]
fn install_over_registered_app_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = installed_daemon(dir.path());

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_FAILED);
    assert_eq!(daemon.store.len(), 1);
}

#[test]
fn install_with_lib_directory() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    PackageBuilder::new("foo", BIN)
        .lib("libfoo.so", b"library bytes")
        .write_to(&daemon.config.apps_dir)
        .unwrap();

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Install, "foo.tar"),
    );
    assert_eq!(reply.code, CODE_OK);

    let task = daemon.store.find("foo").unwrap();
    assert_eq!(task.cfg.as_ref().unwrap().lib_path.as_deref(), Some("lib"));
    assert!(daemon.config.ext_dir.join("foo/lib/libfoo.so").is_file());
}
