//! Test helpers for behavioral specifications.
//!
//! Provides a sandboxed daemon instance plus a datagram client speaking
//! the control protocol.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use appctl_adapters::test_support::PackageBuilder;
use appctl_core::CtlCommand;
use appctl_daemon::protocol;
use appctl_daemon::{ControlReply, ControlRequest, MAX_DATAGRAM};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// Fast monitor tick for specs (milliseconds).
pub const SPEC_TICK_MS: &str = "100";

/// How long to wait for the daemon socket / state changes.
pub const SPEC_WAIT_MAX: Duration = Duration::from_secs(5);

/// Poll interval while waiting.
pub const SPEC_POLL: Duration = Duration::from_millis(10);

/// Executable payload installed by specs: parks long enough for any spec,
/// then exits on its own so a killed test run cannot leak it forever.
pub const SPEC_BIN: &[u8] = b"#!/bin/sh\nexec sleep 60\n";

/// Returns the path to the daemon binary.
///
/// Resolves relative to the test binary itself: the test lives at
/// target/debug/deps/specs-<hash>, so its grandparent is target/debug/
/// where appctl-daemon is built.
pub fn daemon_binary() -> PathBuf {
    let standard = Path::new(env!("CARGO_MANIFEST_DIR")).join("target/debug/appctl-daemon");
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join("appctl-daemon");
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// A sandboxed daemon plus a control-channel client.
pub struct TestBed {
    pub dir: tempfile::TempDir,
    daemon: Option<Child>,
    client: UnixDatagram,
}

impl TestBed {
    /// Spawn the daemon in a fresh sandbox and wait until it listens.
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hostname"), "spec-host\n").unwrap();

        let client = UnixDatagram::bind(dir.path().join("client.sock")).unwrap();
        client.set_read_timeout(Some(SPEC_WAIT_MAX)).unwrap();

        let mut bed = TestBed {
            dir,
            daemon: None,
            client,
        };
        bed.spawn_daemon();
        bed
    }

    fn spawn_daemon(&mut self) {
        assert!(self.daemon.is_none(), "daemon already running");
        let root = self.dir.path();
        let child = Command::new(daemon_binary())
            .env("APPCTL_APPS_DIR", self.apps_dir())
            .env("APPCTL_EXT_DIR", self.ext_dir())
            .env("APPCTL_STATE_DIR", root.join("state"))
            .env("APPCTL_SOCKET", self.socket_path())
            .env("APPCTL_WARN_ADDR", "127.0.0.1:9") // discard
            .env("APPCTL_HOSTNAME_FILE", root.join("hostname"))
            .env("APPCTL_TICK_MS", SPEC_TICK_MS)
            .spawn()
            .unwrap();
        self.daemon = Some(child);

        // Ready once the control socket exists
        let deadline = Instant::now() + SPEC_WAIT_MAX;
        while !self.socket_path().exists() {
            assert!(Instant::now() < deadline, "daemon did not come up");
            std::thread::sleep(SPEC_POLL);
        }
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.dir.path().join("apps")
    }

    pub fn ext_dir(&self) -> PathBuf {
        self.dir.path().join("extapps")
    }

    pub fn socket_path(&self) -> PathBuf {
        self.dir.path().join("appctl-daemon.sock")
    }

    /// Send one request datagram.
    pub fn send(&self, request: &ControlRequest) {
        let bytes = protocol::encode(request).unwrap();
        self.client.send_to(&bytes, self.socket_path()).unwrap();
    }

    /// Receive one reply datagram.
    pub fn recv(&self) -> ControlReply {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (size, _) = self.client.recv_from(&mut buf).unwrap();
        protocol::decode(&buf[..size]).unwrap()
    }

    /// One request, one reply.
    pub fn request(&self, request: &ControlRequest) -> ControlReply {
        self.send(request);
        self.recv()
    }

    /// One request, replies until the terminal chunk (code != 1).
    pub fn request_all(&self, request: &ControlRequest) -> Vec<ControlReply> {
        self.send(request);
        let mut replies = Vec::new();
        loop {
            let reply = self.recv();
            let terminal = reply.code != 1;
            replies.push(reply);
            if terminal {
                return replies;
            }
        }
    }

    /// Build a signed package and drop it into the apps dir.
    pub fn drop_package(&self, name: &str) {
        PackageBuilder::new(name, SPEC_BIN)
            .write_to(&self.apps_dir())
            .unwrap();
    }

    /// Drop a package and INSTALL it.
    pub fn install(&self, name: &str) {
        self.drop_package(name);
        let reply = self.request(&ControlRequest::new(
            CtlCommand::Install,
            &format!("{}.tar", name),
        ));
        assert_eq!(reply.code, 0, "install failed: {}", reply.result);
    }

    /// The single SrvItem of a named LIST reply.
    pub fn srv_item(&self, name: &str) -> appctl_daemon::SrvItem {
        let reply = self.request(&ControlRequest::new(CtlCommand::List, name));
        assert_eq!(reply.code, 0, "list failed for {}", name);
        reply.items[0].srv_items[0].clone()
    }

    /// Poll the named task until `predicate` holds.
    pub fn wait_for_srv(
        &self,
        name: &str,
        what: &str,
        predicate: impl Fn(&appctl_daemon::SrvItem) -> bool,
    ) -> appctl_daemon::SrvItem {
        let deadline = Instant::now() + SPEC_WAIT_MAX;
        loop {
            let item = self.srv_item(name);
            if predicate(&item) {
                return item;
            }
            assert!(
                Instant::now() < deadline,
                "timed out waiting for {} on {}",
                what,
                name
            );
            std::thread::sleep(SPEC_POLL);
        }
    }

    /// Terminate the daemon (SIGTERM) and wait for it to exit.
    pub fn stop_daemon(&mut self) {
        let mut child = self.daemon.take().expect("daemon not running");
        let pid = child.id().to_string();
        Command::new("kill")
            .args(["-TERM", &pid])
            .status()
            .unwrap();
        let status = child.wait().unwrap();
        assert!(status.success(), "daemon exit status: {status}");
    }

    /// Stop and start again over the same sandbox (reboot simulation).
    pub fn restart_daemon(&mut self) {
        self.stop_daemon();
        self.spawn_daemon();
    }
}

impl Drop for TestBed {
    fn drop(&mut self) {
        if let Some(mut child) = self.daemon.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
