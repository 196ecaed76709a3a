// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot persistence for the task table.
//!
//! The whole table (items plus the install-time default thresholds) is one
//! JSON document, rewritten in full on every persist. Saves are atomic
//! (write to `.tmp`, sync, rename) so a crash mid-write never corrupts the
//! previous snapshot.

use appctl_core::TaskTable;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur in snapshot operations
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk form of the task table.
pub struct Snapshot;

impl Snapshot {
    /// Save the table atomically (write to .tmp, then rename), mode 0644.
    pub fn save(table: &TaskTable, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");

        // Write to temp file and sync
        {
            let file = File::create(&tmp_path)?;
            file.set_permissions(fs::Permissions::from_mode(0o644))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, table)?;
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
        }

        // Atomic rename
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    /// Load the table if a snapshot exists.
    ///
    /// Returns `Ok(None)` if the file doesn't exist or is corrupt. A corrupt
    /// snapshot is moved aside to `.bak` so the daemon can start fresh
    /// without destroying the evidence.
    pub fn load(path: &Path) -> Result<Option<TaskTable>, SnapshotError> {
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        match serde_json::from_reader(reader) {
            Ok(table) => Ok(Some(table)),
            Err(e) => {
                let bak_path = bak_path(path);
                warn!(
                    error = %e,
                    path = %path.display(),
                    bak = %bak_path.display(),
                    "Corrupt snapshot, moving to .bak and starting fresh",
                );
                fs::rename(path, &bak_path)?;
                Ok(None)
            }
        }
    }
}

fn bak_path(path: &Path) -> PathBuf {
    path.with_extension("bak")
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
