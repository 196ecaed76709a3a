// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervised task records and the in-memory task table.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default CPU/memory threshold applied to freshly installed tasks (percent).
pub const DEFAULT_THRESHOLD: u32 = 90;

/// Observed state of a supervised application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    /// Installed but never started
    #[default]
    Install,
    /// Process is alive
    Running,
    /// Process is not alive
    Stop,
}

impl TaskStatus {
    /// Wire representation (int8 in list replies).
    pub fn as_i8(self) -> i8 {
        match self {
            TaskStatus::Install => 0,
            TaskStatus::Running => 1,
            TaskStatus::Stop => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Install => write!(f, "install"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Stop => write!(f, "stop"),
        }
    }
}

impl serde::Serialize for TaskStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TaskStatus::Install => serializer.serialize_str("install"),
            TaskStatus::Running => serializer.serialize_str("running"),
            TaskStatus::Stop => serializer.serialize_str("stop"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for TaskStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "install" => Ok(TaskStatus::Install),
            "running" => Ok(TaskStatus::Running),
            "stop" => Ok(TaskStatus::Stop),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["install", "running", "stop"],
            )),
        }
    }
}

/// Desired state of a supervised application.
///
/// Recomputed from `enable` when the table is reloaded, so a persisted
/// snapshot never pins a stale desire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DesiredCmd {
    /// Keep the process down
    #[default]
    Stop,
    /// Keep the process up (monitor respawns it when dead)
    Start,
}

impl fmt::Display for DesiredCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredCmd::Stop => write!(f, "stop"),
            DesiredCmd::Start => write!(f, "start"),
        }
    }
}

impl serde::Serialize for DesiredCmd {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DesiredCmd::Stop => serializer.serialize_str("stop"),
            DesiredCmd::Start => serializer.serialize_str("start"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for DesiredCmd {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "stop" => Ok(DesiredCmd::Stop),
            "start" => Ok(DesiredCmd::Start),
            other => Err(serde::de::Error::unknown_variant(other, &["stop", "start"])),
        }
    }
}

/// Per-app configuration shipped inside the package (`app.cfg`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCfg {
    #[serde(rename = "appname")]
    pub app_name: String,
    #[serde(rename = "binname")]
    pub bin_name: String,
    /// Private shared-library directory, relative to the app root
    #[serde(rename = "libpath", default, skip_serializing_if = "Option::is_none")]
    pub lib_path: Option<String>,
}

impl TaskCfg {
    /// Read and parse an `app.cfg` file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::MissingFile(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(AppError::Read)?;
        serde_json::from_str(&content).map_err(|e| AppError::Decode(e.to_string()))
    }
}

/// One supervised application: identity, desired and observed state,
/// supervision policy, and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Absolute path of the executable (`<apps-ext>/<name>/bin/<bin-name>`)
    pub path: PathBuf,
    /// Extra argv element passed to the process (empty = none)
    #[serde(default)]
    pub param: String,

    pub cmd: DesiredCmd,
    /// 1 = supervised, 0 = administratively disabled
    pub enable: u8,

    #[serde(default)]
    pub status: TaskStatus,
    /// 0 when not running; may be stale in a persisted snapshot
    #[serde(default)]
    pub pid: i32,
    #[serde(default)]
    pub cpu_rate: u32,
    #[serde(default)]
    pub mem_rate: u32,

    pub cpu_threshold: u32,
    pub mem_threshold: u32,
    pub cpu_limit: u32,
    pub mem_limit: u32,

    #[serde(default)]
    pub version: String,
    /// Hex MD5 of the executable
    #[serde(default)]
    pub hash: String,

    /// Unix seconds of the last successful spawn (0 = never started)
    #[serde(default)]
    pub start_time: i64,
    /// Set once at install
    #[serde(default)]
    pub log_start_time: i64,
    /// Bumped on every event-log append
    #[serde(default)]
    pub log_end_time: i64,

    /// Absolute path of the per-app event log
    #[serde(default)]
    pub log_file: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cfg: Option<TaskCfg>,
}

impl Task {
    /// Build the record for a freshly installed app.
    ///
    /// Installed tasks start enabled but stopped; the first explicit START
    /// (or the monitor, once `cmd` flips) brings them up.
    #[allow(clippy::too_many_arguments)]
    pub fn installed(
        name: &str,
        path: PathBuf,
        log_file: PathBuf,
        version: String,
        hash: String,
        cfg: TaskCfg,
        defaults: (u32, u32),
        now: i64,
    ) -> Self {
        Task {
            name: name.to_string(),
            path,
            param: String::new(),
            cmd: DesiredCmd::Stop,
            enable: 1,
            status: TaskStatus::Install,
            pid: 0,
            cpu_rate: 0,
            mem_rate: 0,
            cpu_threshold: defaults.0,
            mem_threshold: defaults.1,
            cpu_limit: DEFAULT_THRESHOLD,
            mem_limit: DEFAULT_THRESHOLD,
            version,
            hash,
            start_time: 0,
            log_start_time: now,
            log_end_time: now,
            log_file,
            cfg: Some(cfg),
        }
    }

    /// True when the table believes the process is up.
    pub fn is_running(&self) -> bool {
        self.status == TaskStatus::Running
    }

    /// Reset observed state after a reload: PIDs from a snapshot are stale,
    /// and desire follows the persisted enable flag.
    pub fn reset_observed(&mut self) {
        self.pid = 0;
        self.status = TaskStatus::Stop;
        self.cpu_rate = 0;
        self.mem_rate = 0;
        self.cmd = if self.enable == 1 {
            DesiredCmd::Start
        } else {
            DesiredCmd::Stop
        };
    }

    /// Record a successful spawn.
    pub fn mark_started(&mut self, pid: i32, now: i64) {
        self.pid = pid;
        self.status = TaskStatus::Running;
        self.start_time = now;
    }

    /// Record that the process is down.
    pub fn mark_stopped(&mut self) {
        self.pid = 0;
        self.status = TaskStatus::Stop;
        self.cpu_rate = 0;
        self.mem_rate = 0;
    }
}

/// Percent fields accept 0..=100.
pub fn valid_percent(value: i64) -> bool {
    (0..=100).contains(&value)
}

/// Ordered registry of installed tasks plus the install-time default
/// thresholds. Names are unique; all mutation funnels through the daemon
/// event loop, so the table itself carries no locking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTable {
    pub cpu_threshold: u32,
    pub mem_threshold: u32,
    #[serde(default)]
    pub items: Vec<Task>,
}

impl Default for TaskTable {
    fn default() -> Self {
        TaskTable {
            cpu_threshold: DEFAULT_THRESHOLD,
            mem_threshold: DEFAULT_THRESHOLD,
            items: Vec::new(),
        }
    }
}

impl TaskTable {
    /// First task with the given name.
    pub fn find(&self, name: &str) -> Option<&Task> {
        self.items.iter().find(|t| t.name == name)
    }

    /// Mutable variant of [`find`](Self::find).
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Task> {
        self.items.iter_mut().find(|t| t.name == name)
    }

    /// Insert a task, keyed by name.
    ///
    /// Idempotent: when a task of the same name exists, the existing record
    /// is left untouched and `AlreadyInstalled` is returned.
    pub fn insert(&mut self, task: Task) -> Result<(), AppError> {
        if self.find(&task.name).is_some() {
            return Err(AppError::AlreadyInstalled(task.name));
        }
        self.items.push(task);
        Ok(())
    }

    /// Remove a task by name. Returns false when absent.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.name != name);
        self.items.len() != before
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.items.iter_mut()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
