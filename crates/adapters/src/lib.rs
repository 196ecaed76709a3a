// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! appctl-adapters: OS seams for the supervisor daemon.
//!
//! Each adapter hides one piece of the platform behind a trait so the
//! daemon's control loop stays testable: process lifecycle, resource
//! sampling, warning delivery, and signed-package handling.

pub mod notify;
pub mod package;
pub mod process;
pub mod sampler;
pub mod verify;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use notify::{UdpWarnNotifier, WarnKind, WarnNotifier, Warning};
pub use package::PackageTree;
pub use process::{ProcessAdapter, SpawnSpec, UnixProcessAdapter};
pub use sampler::{ProcSampler, ResourceSampler};
pub use verify::{md5_hex, verify_executable, Verdict};

#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeWarnNotifier;
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use sampler::FakeSampler;
