//! Install → list → start → stop → rm over the real socket.

use crate::prelude::*;
use appctl_adapters::test_support::PackageBuilder;
use appctl_core::CtlCommand;
use appctl_daemon::ControlRequest;

#[test]
fn install_list_start_stop_rm() {
    let bed = TestBed::start();

    // INSTALL
    bed.drop_package("foo");
    let reply = bed.request(&ControlRequest::new(CtlCommand::Install, "foo.tar"));
    assert_eq!(reply.code, 0);
    assert_eq!(reply.result, "Success.");
    assert!(bed.ext_dir().join("foo/bin/foo").is_file());

    // LIST shows the installed, enabled, not-yet-started app
    let reply = bed.request(&ControlRequest::new(CtlCommand::List, "foo"));
    assert_eq!(reply.code, 0);
    let item = &reply.items[0];
    assert_eq!(item.name, "foo");
    assert_eq!(item.version, "SV01.001");
    assert_eq!(item.hash.len(), 32);
    assert_eq!(item.srv_total, 1);
    let srv = &item.srv_items[0];
    assert_eq!(srv.status, 0); // install
    assert_eq!(srv.enable, 1);
    assert_eq!(srv.start_time, 0);

    // START
    let reply = bed.request(&ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, 0);
    assert_eq!(reply.result, "Success.");
    let srv = bed.srv_item("foo");
    assert_eq!(srv.status, 1); // running
    assert!(srv.start_time > 0);

    // STOP
    let reply = bed.request(&ControlRequest::new(CtlCommand::Stop, "foo"));
    assert_eq!(reply.code, 0);
    let srv = bed.srv_item("foo");
    assert_eq!(srv.status, 2); // stop

    // RM
    let reply = bed.request(&ControlRequest::new(CtlCommand::Rm, "foo"));
    assert_eq!(reply.code, 0);
    assert!(!bed.ext_dir().join("foo").exists());
    let reply = bed.request(&ControlRequest::new(CtlCommand::List, "foo"));
    assert_eq!(reply.code, 2); // not found
}

#[test]
fn tampered_package_is_rejected() {
    let bed = TestBed::start();

    // Signed over different bytes than the shipped executable
    PackageBuilder::new("foo", SPEC_BIN)
        .sign_as(b"#!/bin/sh\nexec sleep 61\n")
        .write_to(&bed.apps_dir())
        .unwrap();

    let reply = bed.request(&ControlRequest::new(CtlCommand::Install, "foo.tar"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, "Verify file sign failed.");
    assert!(!bed.ext_dir().join("foo").exists());
}

#[test]
fn install_of_missing_package_names_the_file() {
    let bed = TestBed::start();

    let reply = bed.request(&ControlRequest::new(CtlCommand::Install, "ghost.tar"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, "Error: File ghost.tar not exist.");
}

#[test]
fn start_of_unknown_task_fails() {
    let bed = TestBed::start();

    let reply = bed.request(&ControlRequest::new(CtlCommand::Start, "nope"));
    assert_eq!(reply.code, 1);
    assert_eq!(reply.result, "Operation failed.");
}

#[test]
fn thresholds_config_and_query_round_trip() {
    let bed = TestBed::start();
    bed.install("foo");

    let reply = bed.request(&ControlRequest::with_value(
        CtlCommand::ConfigCpuThreshold,
        "foo",
        75,
    ));
    assert_eq!(reply.code, 0);

    let reply = bed.request(&ControlRequest::new(CtlCommand::QueryCpuThreshold, "foo"));
    assert_eq!(reply.code, 0);
    assert_eq!(reply.result, "75");

    // Untouched field keeps its install default
    let reply = bed.request(&ControlRequest::new(CtlCommand::QueryMemThreshold, "foo"));
    assert_eq!(reply.result, "90");

    let reply = bed.request(&ControlRequest::new(CtlCommand::QueryAllResource, ""));
    assert_eq!(reply.code, 0);
    let payload: serde_json::Value = serde_json::from_str(&reply.result).unwrap();
    assert_eq!(payload["items"][0]["name"], "foo");
    assert_eq!(payload["items"][0]["cputhreshold"], 75);
}

#[test]
fn version_is_answered_for_container() {
    let bed = TestBed::start();

    let reply = bed.request(&ControlRequest::new(CtlCommand::Version, "container"));
    assert_eq!(reply.code, 0);
    assert!(!reply.result.is_empty());
}

#[test]
fn logs_lists_installed_event_logs() {
    let bed = TestBed::start();
    bed.install("foo");

    let reply = bed.request(&ControlRequest::new(CtlCommand::Logs, ""));
    assert_eq!(reply.code, 0);
    assert!(reply.result.ends_with("foo/event.log"));
}
