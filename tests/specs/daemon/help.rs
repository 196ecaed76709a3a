//! Info flags of the daemon binary.

use crate::prelude::*;
use std::process::Command;

#[test]
fn version_flag_prints_and_exits_zero() {
    let output = Command::new(daemon_binary())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("appctl-daemon "));
}

#[test]
fn help_flag_describes_usage() {
    let output = Command::new(daemon_binary()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("USAGE"));
    assert!(stdout.contains("appctl-daemon"));
}

#[test]
fn unexpected_argument_exits_nonzero() {
    let output = Command::new(daemon_binary())
        .arg("--bogus")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected argument"));
}
