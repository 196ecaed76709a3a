// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use appctl_core::{DesiredCmd, Task, TaskCfg, TaskStatus, DEFAULT_THRESHOLD};
use std::path::Path;
use std::time::Duration;

fn test_config(dir: &Path) -> Config {
    Config {
        apps_dir: dir.join("apps"),
        ext_dir: dir.join("extapps"),
        state_dir: dir.join("state"),
        socket_path: dir.join("d.sock"),
        lock_path: dir.join("state/appctl-daemon.pid"),
        log_path: dir.join("state/appctl-daemon.log"),
        warn_addr: "127.0.0.1:0".to_string(),
        hostname_file: dir.join("hostname"),
        tick: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn startup_binds_socket_and_takes_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    std::fs::write(dir.path().join("hostname"), "box-1\n").unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).unwrap();

    assert!(config.socket_path.exists());
    assert!(config.apps_dir.is_dir());
    assert!(config.ext_dir.is_dir());

    let pid: u32 = std::fs::read_to_string(&config.lock_path)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert_eq!(pid, std::process::id());
    assert_eq!(result.daemon.container_id, "box-1");

    let mut daemon = result.daemon;
    daemon.shutdown();
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn second_startup_is_locked_out() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    let config = test_config(dir.path());

    let _first = startup(&config).unwrap();

    let mut second_config = test_config(dir.path());
    second_config.socket_path = dir.path().join("d2.sock");
    let err = startup(&second_config).unwrap_err();
    assert!(matches!(err, LifecycleError::LockFailed(_)));
}

#[tokio::test]
async fn startup_without_hostname_file_uses_empty_cid() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    let config = test_config(dir.path());

    let result = startup(&config).unwrap();
    assert_eq!(result.daemon.container_id, "");
}

#[tokio::test]
async fn startup_reloads_the_persisted_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.state_dir).unwrap();

    // Persist a table as a previous daemon run would have
    let app_dir = config.ext_dir.join("foo");
    std::fs::create_dir_all(app_dir.join("bin")).unwrap();
    std::fs::write(
        app_dir.join("app.cfg"),
        r#"{"appname":"foo","binname":"foo"}"#,
    )
    .unwrap();

    let mut store = TaskStore::new(&config.state_dir, &config.ext_dir);
    let mut task = Task::installed(
        "foo",
        app_dir.join("bin/foo"),
        app_dir.join("event.log"),
        "SV01.001".to_string(),
        String::new(),
        TaskCfg {
            app_name: "foo".to_string(),
            bin_name: "foo".to_string(),
            lib_path: None,
        },
        (DEFAULT_THRESHOLD, DEFAULT_THRESHOLD),
        1_700_000_000,
    );
    task.enable = 1;
    task.mark_started(4242, 1_700_000_100); // stale pid from the old run
    store.insert(task).unwrap();
    store.persist().unwrap();

    let result = startup(&config).unwrap();
    let task = result.daemon.store.find("foo").unwrap();
    assert_eq!(task.pid, 0);
    assert_eq!(task.status, TaskStatus::Stop);
    assert_eq!(task.cmd, DesiredCmd::Start);
    assert!(task.cfg.is_some());
}

#[tokio::test]
async fn bind_failure_is_surfaced() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    std::fs::create_dir_all(dir.path().join("state")).unwrap();
    config.socket_path = dir.path().join("no-such-dir/d.sock");

    let err = startup(&config).unwrap_err();
    assert!(matches!(err, LifecycleError::BindFailed(_, _)));
}
