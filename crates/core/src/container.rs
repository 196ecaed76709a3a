// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container identity lookup.
//!
//! Inside a container `/etc/hostname` holds the container id; the daemon
//! reads it once at startup and stamps it into warning notifications.

use crate::error::AppError;
use std::path::Path;

/// Read the container id from a hostname file, stripped of whitespace.
pub fn container_id(path: &Path) -> Result<String, AppError> {
    if !path.exists() {
        return Err(AppError::MissingFile(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(AppError::Read)?;
    Ok(content.trim().to_string())
}
