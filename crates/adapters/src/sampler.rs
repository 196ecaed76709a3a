// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-process CPU and memory sampling.
//!
//! The monitor asks for integer percentages once per tick. The real
//! sampler reads procfs: CPU% is the process jiffy delta over the total
//! jiffy delta between two calls, memory% is VmRSS against MemTotal.
//! The first observation of a PID has no delta and reports 0% CPU.

use appctl_core::AppError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Injected sampling seam (`sample(name, pid) → (cpu%, mem%)`).
pub trait ResourceSampler: Send {
    fn sample(&mut self, name: &str, pid: i32) -> Result<(u32, u32), AppError>;

    /// Drop cached state for a PID (after kill/restart).
    fn forget(&mut self, _pid: i32) {}
}

/// procfs-backed sampler.
pub struct ProcSampler {
    proc_root: PathBuf,
    mem_total_kb: u64,
    last: HashMap<i32, JiffySample>,
}

#[derive(Debug, Clone, Copy)]
struct JiffySample {
    process: u64,
    total: u64,
}

impl ProcSampler {
    pub fn new() -> Self {
        Self::with_proc_root(Path::new("/proc"))
    }

    /// Sampler rooted at an alternate procfs path (tests point this at a
    /// fixture tree).
    pub fn with_proc_root(proc_root: &Path) -> Self {
        let mut sampler = ProcSampler {
            proc_root: proc_root.to_path_buf(),
            mem_total_kb: 0,
            last: HashMap::new(),
        };
        sampler.mem_total_kb = sampler.read_mem_total_kb().unwrap_or(0);
        sampler
    }

    /// `MemTotal` from /proc/meminfo, read once at construction.
    fn read_mem_total_kb(&self) -> Option<u64> {
        let content = std::fs::read_to_string(self.proc_root.join("meminfo")).ok()?;
        parse_kb_line(&content, "MemTotal:")
    }

    /// Sum of all jiffy columns of the aggregate `cpu` line in /proc/stat.
    fn read_total_jiffies(&self) -> Result<u64, AppError> {
        let content = std::fs::read_to_string(self.proc_root.join("stat")).map_err(AppError::Read)?;
        let line = content
            .lines()
            .find(|l| l.starts_with("cpu "))
            .ok_or_else(|| AppError::Decode("no cpu line in /proc/stat".to_string()))?;
        Ok(line
            .split_whitespace()
            .skip(1)
            .filter_map(|f| f.parse::<u64>().ok())
            .sum())
    }

    /// utime + stime of a PID from /proc/<pid>/stat.
    ///
    /// The comm field may contain spaces, so fields are counted from the
    /// closing paren rather than the line start.
    fn read_process_jiffies(&self, pid: i32) -> Result<u64, AppError> {
        let path = self.proc_root.join(pid.to_string()).join("stat");
        let content = std::fs::read_to_string(path).map_err(AppError::Read)?;
        let after_comm = content
            .rfind(')')
            .map(|i| &content[i + 1..])
            .ok_or_else(|| AppError::Decode("malformed pid stat line".to_string()))?;
        let fields: Vec<&str> = after_comm.split_whitespace().collect();
        // Fields after comm: state is index 0, utime is 11, stime is 12
        let utime: u64 = fields
            .get(11)
            .and_then(|f| f.parse().ok())
            .ok_or(AppError::SampleUnavailable(pid))?;
        let stime: u64 = fields
            .get(12)
            .and_then(|f| f.parse().ok())
            .ok_or(AppError::SampleUnavailable(pid))?;
        Ok(utime + stime)
    }

    /// VmRSS of a PID from /proc/<pid>/status, in kB.
    fn read_rss_kb(&self, pid: i32) -> Result<u64, AppError> {
        let path = self.proc_root.join(pid.to_string()).join("status");
        let content = std::fs::read_to_string(path).map_err(AppError::Read)?;
        parse_kb_line(&content, "VmRSS:").ok_or(AppError::SampleUnavailable(pid))
    }
}

impl Default for ProcSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceSampler for ProcSampler {
    fn sample(&mut self, _name: &str, pid: i32) -> Result<(u32, u32), AppError> {
        let total = self.read_total_jiffies()?;
        let process = self.read_process_jiffies(pid)?;

        let cpu = match self.last.insert(pid, JiffySample { process, total }) {
            Some(prev) if total > prev.total => {
                let dp = process.saturating_sub(prev.process) as f64;
                let dt = (total - prev.total) as f64;
                // Percentage of one full machine, matching what top reports
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get() as f64)
                    .unwrap_or(1.0);
                ((dp / dt) * 100.0 * cores).round().min(100.0) as u32
            }
            _ => 0,
        };

        let mem = if self.mem_total_kb > 0 {
            let rss = self.read_rss_kb(pid)? as f64;
            ((rss / self.mem_total_kb as f64) * 100.0).round().min(100.0) as u32
        } else {
            0
        };

        Ok((cpu, mem))
    }

    fn forget(&mut self, pid: i32) {
        self.last.remove(&pid);
    }
}

/// Parse a `Label:   1234 kB` style line.
fn parse_kb_line(content: &str, label: &str) -> Option<u64> {
    content
        .lines()
        .find(|l| l.starts_with(label))?
        .split_whitespace()
        .nth(1)?
        .parse()
        .ok()
}

/// Scripted sampler for tests: fixed `(cpu, mem)` per app name.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone, Default)]
pub struct FakeSampler {
    values: std::sync::Arc<parking_lot::Mutex<HashMap<String, (u32, u32)>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSampler {
    pub fn new() -> Self {
        FakeSampler::default()
    }

    pub fn set(&self, name: &str, cpu: u32, mem: u32) {
        self.values.lock().insert(name.to_string(), (cpu, mem));
    }

    pub fn clear(&self, name: &str) {
        self.values.lock().remove(name);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ResourceSampler for FakeSampler {
    fn sample(&mut self, name: &str, _pid: i32) -> Result<(u32, u32), AppError> {
        Ok(self.values.lock().get(name).copied().unwrap_or((0, 0)))
    }
}

#[cfg(test)]
#[path = "sampler_tests.rs"]
mod tests;
