// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warning delivery to the collector.
//!
//! One JSON datagram per threshold crossing. Delivery is strictly
//! best-effort: the monitor must never block or fail a tick because the
//! collector is unreachable, so send errors are logged and dropped.

use serde::{Deserialize, Serialize};
use std::net::UdpSocket;
use tracing::warn;

/// Default collector endpoint (the container host bridge).
pub const DEFAULT_WARN_ADDR: &str = "172.17.0.1:5600";

/// Which resource crossed its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarnKind {
    Cpu,
    Mem,
}

/// A single threshold-crossing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Container id (contents of /etc/hostname)
    pub cid: String,
    /// App name
    pub name: String,
    pub kind: WarnKind,
    /// Observed percentage
    pub value: u32,
    /// Configured threshold percentage
    pub threshold: u32,
}

/// Seam for warning delivery.
pub trait WarnNotifier: Send {
    fn warn(&self, warning: &Warning);
}

/// Real notifier: fire-and-forget UDP datagrams.
pub struct UdpWarnNotifier {
    socket: Option<UdpSocket>,
    target: String,
}

impl UdpWarnNotifier {
    /// Bind an ephemeral local port for sends to `target`.
    ///
    /// A bind failure is downgraded to a dead notifier: warnings are
    /// dropped (and logged) instead of failing daemon startup.
    pub fn new(target: &str) -> Self {
        let socket = match UdpSocket::bind("0.0.0.0:0") {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(error = %e, "warning socket unavailable, notifications disabled");
                None
            }
        };
        UdpWarnNotifier {
            socket,
            target: target.to_string(),
        }
    }
}

impl WarnNotifier for UdpWarnNotifier {
    fn warn(&self, warning: &Warning) {
        let Some(socket) = &self.socket else {
            return;
        };
        let payload = match serde_json::to_vec(warning) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "warning encode failed");
                return;
            }
        };
        if let Err(e) = socket.send_to(&payload, &self.target) {
            warn!(target = %self.target, error = %e, "warning send failed");
        }
    }
}

/// Collecting notifier for tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeWarnNotifier {
    sent: std::sync::Arc<parking_lot::Mutex<Vec<Warning>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeWarnNotifier {
    pub fn new() -> Self {
        FakeWarnNotifier::default()
    }

    pub fn sent(&self) -> Vec<Warning> {
        self.sent.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl WarnNotifier for FakeWarnNotifier {
    fn warn(&self, warning: &Warning) {
        self.sent.lock().push(warning.clone());
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
