// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed-package handling: extraction and the on-disk app tree.
//!
//! A package is a gzip-compressed tar that unpacks to
//! `<apps-ext>/<name>/` containing `bin/<bin-name>`, an optional `lib/`,
//! `version.cfg`, `app.cfg`, and `sign.cfg`. Anything else is rejected by
//! the install pipeline.

use appctl_core::{AppError, TaskCfg};
use flate2::read::GzDecoder;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const APP_CFG_FILE: &str = "app.cfg";
pub const VERSION_FILE: &str = "version.cfg";
pub const SIGN_FILE: &str = "sign.cfg";
pub const EVENT_LOG_FILE: &str = "event.log";

/// An extracted (or previously installed) app tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTree {
    root: PathBuf,
    name: String,
}

impl PackageTree {
    /// Decompress `archive` into the extraction root and return the app
    /// tree. The archive must contain a single `<name>/` top directory.
    pub fn extract(archive: &Path, ext_dir: &Path, name: &str) -> Result<Self, AppError> {
        if !archive.exists() {
            return Err(AppError::MissingFile(archive.to_path_buf()));
        }
        std::fs::create_dir_all(ext_dir).map_err(AppError::Write)?;

        let file = File::open(archive).map_err(AppError::Read)?;
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.unpack(ext_dir)
            .map_err(|e| AppError::Decompress(e.to_string()))?;

        let root = ext_dir.join(name);
        if !root.is_dir() {
            return Err(AppError::Decompress(format!(
                "archive did not contain {}/",
                name
            )));
        }

        Ok(PackageTree {
            root,
            name: name.to_string(),
        })
    }

    /// View of an already-installed tree (no extraction).
    pub fn installed(ext_dir: &Path, name: &str) -> Self {
        PackageTree {
            root: ext_dir.join(name),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn bin_path(&self, bin_name: &str) -> PathBuf {
        self.bin_dir().join(bin_name)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn event_log_path(&self) -> PathBuf {
        self.root.join(EVENT_LOG_FILE)
    }

    /// Version string from `version.cfg`, whitespace stripped.
    pub fn version(&self) -> Result<String, AppError> {
        let path = self.root.join(VERSION_FILE);
        if !path.exists() {
            return Err(AppError::MissingFile(path));
        }
        let content = std::fs::read_to_string(&path).map_err(AppError::Read)?;
        Ok(content.trim().to_string())
    }

    /// Parsed `app.cfg`.
    pub fn cfg(&self) -> Result<TaskCfg, AppError> {
        TaskCfg::load(&self.root.join(APP_CFG_FILE))
    }

    /// Raw signature bytes from `sign.cfg`.
    pub fn signature(&self) -> Result<Vec<u8>, AppError> {
        let path = self.root.join(SIGN_FILE);
        if !path.exists() {
            return Err(AppError::MissingFile(path));
        }
        std::fs::read(&path).map_err(AppError::Read)
    }

    /// Delete the whole tree (after a failed verify, or on RM).
    pub fn remove(&self) -> Result<(), AppError> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Write(e)),
        }
    }
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
