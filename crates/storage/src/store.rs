// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task store: the in-memory registry plus its on-disk snapshot.
//!
//! All mutation funnels through the daemon event loop, so the store has no
//! internal locking; it owns the table and knows how to persist and reload
//! it.

use crate::snapshot::{Snapshot, SnapshotError};
use appctl_core::{AppError, Task, TaskCfg, TaskTable};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Snapshot file name, written into the daemon state directory.
pub const SNAPSHOT_FILE: &str = "monitor.cfg";

pub struct TaskStore {
    table: TaskTable,
    snapshot_path: PathBuf,
    ext_dir: PathBuf,
}

impl TaskStore {
    /// Create an empty store persisting under `state_dir`.
    pub fn new(state_dir: &Path, ext_dir: &Path) -> Self {
        TaskStore {
            table: TaskTable::default(),
            snapshot_path: state_dir.join(SNAPSHOT_FILE),
            ext_dir: ext_dir.to_path_buf(),
        }
    }

    /// Reload the table from disk.
    ///
    /// Persisted PIDs are stale by definition: every task comes back with
    /// `pid = 0` and its desired cmd recomputed from `enable`. The per-task
    /// `cfg` is repopulated from `<ext>/<name>/app.cfg`; a missing or broken
    /// app.cfg leaves `cfg` empty rather than failing the whole load.
    pub fn load(&mut self) -> Result<(), SnapshotError> {
        let Some(mut table) = Snapshot::load(&self.snapshot_path)? else {
            return Ok(());
        };

        for task in table.iter_mut() {
            task.reset_observed();
            let cfg_path = self.ext_dir.join(&task.name).join("app.cfg");
            match TaskCfg::load(&cfg_path) {
                Ok(cfg) => task.cfg = Some(cfg),
                Err(e) => {
                    warn!(app = %task.name, error = %e, "app.cfg unreadable on reload");
                    task.cfg = None;
                }
            }
        }

        self.table = table;
        Ok(())
    }

    /// Write the current table to `monitor.cfg`.
    pub fn persist(&self) -> Result<(), SnapshotError> {
        Snapshot::save(&self.table, &self.snapshot_path)
    }

    pub fn find(&self, name: &str) -> Option<&Task> {
        self.table.find(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.table.find_mut(name)
    }

    /// Every task, in table order.
    pub fn list(&self) -> Vec<&Task> {
        self.table.iter().collect()
    }

    /// Tasks matching a name (at most one, names are unique).
    pub fn list_by_name(&self, name: &str) -> Vec<&Task> {
        self.table.iter().filter(|t| t.name == name).collect()
    }

    pub fn insert(&mut self, task: Task) -> Result<(), AppError> {
        self.table.insert(task)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.table.remove(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Install-time default thresholds `(cpu, mem)`.
    pub fn defaults(&self) -> (u32, u32) {
        (self.table.cpu_threshold, self.table.mem_threshold)
    }

    pub fn table(&self) -> &TaskTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut TaskTable {
        &mut self.table
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
