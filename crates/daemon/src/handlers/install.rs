// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! INSTALL: extract a dropped-in package, verify its signature, and
//! register the task.

use crate::event_log;
use crate::lifecycle::Daemon;
use crate::protocol::{
    result_file_not_exist, ControlReply, ControlRequest, RESULT_DECOMPRESS_FAILED, RESULT_FAILED,
    RESULT_SUCCESS, RESULT_VERIFY_FAILED,
};
use appctl_adapters::{md5_hex, verify_executable, PackageTree, Verdict};
use appctl_adapters::{ProcessAdapter, ResourceSampler, WarnNotifier};
use appctl_core::{AppError, Clock, Task, TaskCfg};
use std::path::PathBuf;
use tracing::{info, warn};

pub(crate) fn handle_install<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    let package = request.name.as_str();
    let app_name = package.strip_suffix(".tar").unwrap_or(package);

    let archive = daemon.config.apps_dir.join(package);
    if !archive.is_file() {
        return ControlReply::failed(request.cmd, package, &result_file_not_exist(package));
    }

    // Reinstall over a registered app is rejected; RM first.
    if daemon.store.find(app_name).is_some() {
        return ControlReply::failed(request.cmd, package, RESULT_FAILED);
    }

    let tree = match PackageTree::extract(&archive, &daemon.config.ext_dir, app_name) {
        Ok(tree) => tree,
        Err(AppError::Decompress(e)) => {
            warn!(package, error = %e, "decompress failed");
            return ControlReply::failed(request.cmd, package, RESULT_DECOMPRESS_FAILED);
        }
        Err(e) => {
            warn!(package, error = %e, "install failed");
            return ControlReply::failed(request.cmd, package, RESULT_FAILED);
        }
    };

    // Verify before the task becomes visible anywhere. Any defect in the
    // extracted tree (missing files included) deletes it: a half-install
    // must not survive.
    let verified = verify_tree(&tree);
    let (cfg, version, bin, hash) = match verified {
        Ok(parts) => parts,
        Err(e) => {
            warn!(package, error = %e, "package verify failed");
            if let Err(e) = tree.remove() {
                warn!(package, error = %e, "cleanup of unverified tree failed");
            }
            return ControlReply::failed(request.cmd, package, RESULT_VERIFY_FAILED);
        }
    };

    let now = daemon.clock.now();
    let mut task = Task::installed(
        app_name,
        bin,
        tree.event_log_path(),
        version,
        hash,
        cfg,
        daemon.store.defaults(),
        now,
    );
    event_log::append(&mut task, now, "installed");

    if let Err(e) = daemon.store.insert(task) {
        warn!(package, error = %e, "task insert failed");
        return ControlReply::failed(request.cmd, package, RESULT_FAILED);
    }
    if let Err(e) = daemon.store.persist() {
        // In-memory install stands; the table is simply forgotten on restart
        warn!(error = %e, "snapshot persist failed after install");
    }

    info!(app = app_name, "installed");
    ControlReply::ok(request.cmd, package, RESULT_SUCCESS)
}

/// Check the extracted tree: config, version, signature, executable.
fn verify_tree(tree: &PackageTree) -> Result<(TaskCfg, String, PathBuf, String), AppError> {
    let cfg = tree.cfg()?;
    let version = tree.version()?;
    let signature = tree.signature()?;

    let bin = tree.bin_path(&cfg.bin_name);
    match verify_executable(&bin, &signature)? {
        Verdict::Verified => {}
        Verdict::Mismatch => return Err(AppError::Verify),
    }

    let hash = md5_hex(&bin)?;
    Ok((cfg, version, bin, hash))
}
