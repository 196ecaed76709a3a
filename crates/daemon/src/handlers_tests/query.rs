// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::lifecycle::DAEMON_VERSION;
use yare::parameterized;

#[test]
fn version_answers_for_container() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::Version, "container"),
    );
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, DAEMON_VERSION);
}

#[test]
fn version_rejects_other_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Version, "foo"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, RESULT_FAILED);
}

#[parameterized(
    cpu_threshold = { CtlCommand::QueryCpuThreshold, "90" },
    mem_threshold = { CtlCommand::QueryMemThreshold, "90" },
    cpu_limit = { CtlCommand::QueryCpuLimit, "90" },
    mem_limit = { CtlCommand::QueryMemLimit, "90" },
)]
fn query_returns_decimal_string(cmd: CtlCommand, expected: &str) {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    insert_bare_task(&mut daemon, "foo");

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(cmd, "foo"));
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.result, expected);
}

#[test]
fn query_reflects_config_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    insert_bare_task(&mut daemon, "foo");

    dispatch_one(
        &mut daemon,
        &ControlRequest::with_value(CtlCommand::ConfigMemThreshold, "foo", 72),
    );
    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::QueryMemThreshold, "foo"),
    );
    assert_eq!(reply.result, "72");
}

#[test]
fn query_unknown_task_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::QueryCpuThreshold, "nope"),
    );
    assert_eq!(reply.code, 1);
}

#[test]
fn list_empty_table_is_one_final_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let replies = dispatch(&mut daemon, &ControlRequest::new(CtlCommand::List, ""));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].code, CODE_OK);
    assert_eq!(replies[0].result, RESULT_FINISH);
    assert_eq!(replies[0].total, 0);
    assert!(replies[0].items.is_empty());
}

#[test]
fn list_by_name_returns_one_item() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    insert_bare_task(&mut daemon, "foo");

    let replies = dispatch(&mut daemon, &ControlRequest::new(CtlCommand::List, "foo"));
    assert_eq!(replies.len(), 1);
    let reply = &replies[0];
    assert_eq!(reply.code, CODE_OK);
    assert_eq!(reply.total, 1);
    assert_eq!(reply.items.len(), 1);

    let item = &reply.items[0];
    assert_eq!(item.name, "foo");
    assert_eq!(item.version, "SV01.001");
    assert_eq!(item.srv_total, 1);
    assert_eq!(item.srv_items[0].enable, 1);
    assert_eq!(item.srv_items[0].status, 0); // install
}

#[test]
fn list_unknown_name_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());

    let replies = dispatch(&mut daemon, &ControlRequest::new(CtlCommand::List, "ghost"));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].code, CODE_NOT_FOUND);
}

#[test]
fn list_25_apps_chunks_as_10_10_5() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    for i in 0..25 {
        insert_bare_task(&mut daemon, &format!("app{:02}", i));
    }

    let replies = dispatch(&mut daemon, &ControlRequest::new(CtlCommand::List, ""));
    assert_eq!(replies.len(), 3);

    assert_eq!(replies[0].code, 1);
    assert_eq!(replies[0].items.len(), 10);
    assert_eq!(replies[1].code, 1);
    assert_eq!(replies[1].items.len(), 10);
    assert_eq!(replies[2].code, CODE_OK);
    assert_eq!(replies[2].items.len(), 5);
    assert_eq!(replies[2].result, RESULT_FINISH);

    // Every chunk carries the grand total; items sum to it
    let total: usize = replies.iter().map(|r| r.items.len()).sum();
    assert_eq!(total, 25);
    for reply in &replies {
        assert_eq!(reply.total, 25);
    }

    // Indexes are table-global, not per-chunk
    assert_eq!(replies[1].items[0].index, 10);
    assert_eq!(replies[2].items[4].index, 24);
}

#[test]
fn list_exact_multiple_ends_with_empty_final_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    for i in 0..10 {
        insert_bare_task(&mut daemon, &format!("app{}", i));
    }

    let replies = dispatch(&mut daemon, &ControlRequest::new(CtlCommand::List, ""));
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].code, 1);
    assert_eq!(replies[0].items.len(), 10);
    assert_eq!(replies[1].code, CODE_OK);
    assert!(replies[1].items.is_empty());
    assert_eq!(replies[1].result, RESULT_FINISH);
}

#[test]
fn query_all_resource_reports_every_task() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    insert_bare_task(&mut daemon, "a");
    insert_bare_task(&mut daemon, "b");
    dispatch_one(
        &mut daemon,
        &ControlRequest::with_value(CtlCommand::ConfigCpuThreshold, "b", 42),
    );

    let reply = dispatch_one(
        &mut daemon,
        &ControlRequest::new(CtlCommand::QueryAllResource, ""),
    );
    assert_eq!(reply.code, CODE_OK);

    let payload: serde_json::Value = serde_json::from_str(&reply.result).unwrap();
    let items = payload["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "a");
    assert_eq!(items[0]["cputhreshold"], 90);
    assert_eq!(items[1]["name"], "b");
    assert_eq!(items[1]["cputhreshold"], 42);
    assert_eq!(items[1]["memthreshold"], 90);
}

#[test]
fn logs_lists_every_event_log_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut daemon = test_daemon(dir.path());
    insert_bare_task(&mut daemon, "a");
    insert_bare_task(&mut daemon, "b");

    let reply = dispatch_one(&mut daemon, &ControlRequest::new(CtlCommand::Logs, ""));
    assert_eq!(reply.code, CODE_OK);

    let lines: Vec<&str> = reply.result.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("a/event.log"));
    assert!(lines[1].ends_with("b/event.log"));
}
