// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds carried between the daemon's components.
//!
//! Every variant is converted into a `(code, result)` reply pair at the
//! handler boundary; nothing here crosses the wire directly.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("package decompress failed: {0}")]
    Decompress(String),

    #[error("signature verify failed")]
    Verify,

    #[error("app not installed: {0}")]
    NotInstalled(String),

    #[error("app already installed: {0}")]
    AlreadyInstalled(String),

    #[error("spawn failed: {0}")]
    Spawn(String),

    #[error("kill failed: {0}")]
    Kill(String),

    #[error("resource sample unavailable for pid {0}")]
    SampleUnavailable(i32),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("decode failed: {0}")]
    Decode(String),
}
