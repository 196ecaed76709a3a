//! Supervision survives a daemon restart.

use crate::prelude::*;
use appctl_core::CtlCommand;
use appctl_daemon::ControlRequest;

#[test]
fn enabled_running_app_comes_back_after_daemon_restart() {
    let mut bed = TestBed::start();
    bed.install("foo");

    let reply = bed.request(&ControlRequest::new(CtlCommand::Start, "foo"));
    assert_eq!(reply.code, 0);
    let before = bed.srv_item("foo");
    assert_eq!(before.status, 1);

    // Daemon terminates; the app keeps running unsupervised
    bed.restart_daemon();

    // After reload the PID is stale-reset, so the app shows STOP first
    // and the monitor brings it up within a couple of ticks.
    let after = bed.wait_for_srv("foo", "respawn", |srv| srv.status == 1);
    assert_eq!(after.enable, 1);
    assert!(after.start_time >= before.start_time);

    // Clean up the respawned process
    let reply = bed.request(&ControlRequest::new(CtlCommand::Stop, "foo"));
    assert_eq!(reply.code, 0);
}

#[test]
fn stopped_app_stays_down_after_daemon_restart() {
    let mut bed = TestBed::start();
    bed.install("foo");

    // Installed but disabled: must not come up on its own
    let reply = bed.request(&ControlRequest::new(CtlCommand::Disable, "foo"));
    assert_eq!(reply.code, 0);

    bed.restart_daemon();

    // Give the monitor a few ticks, then confirm it stayed down
    std::thread::sleep(std::time::Duration::from_millis(500));
    let srv = bed.srv_item("foo");
    assert_ne!(srv.status, 1);
}

#[test]
fn table_contents_survive_restart() {
    let mut bed = TestBed::start();
    bed.install("foo");
    bed.request(&ControlRequest::with_value(
        CtlCommand::ConfigMemThreshold,
        "foo",
        66,
    ));

    bed.restart_daemon();

    let reply = bed.request(&ControlRequest::new(CtlCommand::QueryMemThreshold, "foo"));
    assert_eq!(reply.code, 0);
    assert_eq!(reply.result, "66");

    let srv = bed.srv_item("foo");
    assert_eq!(srv.enable, 1);
    assert_eq!(srv.mem_threshold, 66);
}
