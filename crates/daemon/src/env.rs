// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Production needs no environment; every knob here exists so tests can
//! sandbox the daemon in a temp directory.

use std::path::PathBuf;
use std::time::Duration;

/// Drop-in directory for inbound packages: APPCTL_APPS_DIR > /usr/local/apps
pub fn apps_dir() -> PathBuf {
    path_var("APPCTL_APPS_DIR", "/usr/local/apps")
}

/// Extraction root: APPCTL_EXT_DIR > /usr/local/extapps
pub fn ext_dir() -> PathBuf {
    path_var("APPCTL_EXT_DIR", "/usr/local/extapps")
}

/// State directory holding monitor.cfg, the lock and the daemon log:
/// APPCTL_STATE_DIR > current working directory
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("APPCTL_STATE_DIR") {
        return PathBuf::from(dir);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Control socket path: APPCTL_SOCKET > /var/run/appctl-daemon.sock
pub fn socket_path() -> PathBuf {
    path_var("APPCTL_SOCKET", "/var/run/appctl-daemon.sock")
}

/// Warning collector endpoint: APPCTL_WARN_ADDR > 172.17.0.1:5600
pub fn warn_addr() -> String {
    std::env::var("APPCTL_WARN_ADDR")
        .unwrap_or_else(|_| appctl_adapters::notify::DEFAULT_WARN_ADDR.to_string())
}

/// Container-id source: APPCTL_HOSTNAME_FILE > /etc/hostname
pub fn hostname_file() -> PathBuf {
    path_var("APPCTL_HOSTNAME_FILE", "/etc/hostname")
}

/// Monitor tick interval: APPCTL_TICK_MS > 1000ms
pub fn tick_interval() -> Duration {
    std::env::var("APPCTL_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(1))
}

fn path_var(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}
