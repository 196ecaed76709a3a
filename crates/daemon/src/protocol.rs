// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control protocol for the local datagram channel.
//!
//! Wire format: one self-describing JSON record per datagram. The command
//! discriminant, field set, order, and integer widths are the contract
//! shared with the CLI; large list replies are chunked across datagrams.

use appctl_core::{CtlCommand, Task};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum datagram payload either side will produce or accept.
pub const MAX_DATAGRAM: usize = 16 * 1024;

/// AppItems per LIST reply datagram.
pub const LIST_CHUNK_SIZE: usize = 10;

/// Done / final chunk.
pub const CODE_OK: i16 = 0;
/// Failed / more chunks follow (LIST).
pub const CODE_FAILED: i16 = 1;
/// Named task does not exist.
pub const CODE_NOT_FOUND: i16 = 2;

pub const RESULT_SUCCESS: &str = "Success.";
pub const RESULT_FAILED: &str = "Operation failed.";
pub const RESULT_FINISH: &str = "Finish.";
pub const RESULT_VERIFY_FAILED: &str = "Verify file sign failed.";
pub const RESULT_DECOMPRESS_FAILED: &str = "Install decompress failed.";

/// Result string for a missing package file.
pub fn result_file_not_exist(name: &str) -> String {
    format!("Error: File {} not exist.", name)
}

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlRequest {
    pub cmd: CtlCommand,
    #[serde(default)]
    pub name: String,
    /// Include log details in list replies (int8 on the wire)
    #[serde(default)]
    pub log: i8,
    /// Value operand for CONFIG_* commands (int32 on the wire)
    #[serde(default)]
    pub value: i32,
}

impl ControlRequest {
    pub fn new(cmd: CtlCommand, name: &str) -> Self {
        ControlRequest {
            cmd,
            name: name.to_string(),
            log: 0,
            value: 0,
        }
    }

    pub fn with_value(cmd: CtlCommand, name: &str, value: i32) -> Self {
        ControlRequest {
            cmd,
            name: name.to_string(),
            log: 0,
            value,
        }
    }
}

/// Reply from daemon to CLI. A single request may produce several replies
/// (LIST chunking); `code` distinguishes intermediate from terminal ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlReply {
    pub cmd: CtlCommand,
    pub name: String,
    pub code: i16,
    pub result: String,
    pub total: i32,
    #[serde(default)]
    pub items: Vec<AppItem>,
}

impl ControlReply {
    pub fn ok(cmd: CtlCommand, name: &str, result: &str) -> Self {
        ControlReply {
            cmd,
            name: name.to_string(),
            code: CODE_OK,
            result: result.to_string(),
            total: 0,
            items: Vec::new(),
        }
    }

    pub fn failed(cmd: CtlCommand, name: &str, result: &str) -> Self {
        ControlReply {
            cmd,
            name: name.to_string(),
            code: CODE_FAILED,
            result: result.to_string(),
            total: 0,
            items: Vec::new(),
        }
    }

    pub fn not_found(cmd: CtlCommand, name: &str) -> Self {
        ControlReply {
            cmd,
            name: name.to_string(),
            code: CODE_NOT_FOUND,
            result: RESULT_FAILED.to_string(),
            total: 0,
            items: Vec::new(),
        }
    }
}

/// One app in a list reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppItem {
    pub index: i32,
    pub name: String,
    pub version: String,
    pub hash: String,
    pub srv_total: i32,
    pub srv_items: Vec<SrvItem>,
    pub log_file: String,
}

/// Per-instance snapshot inside an [`AppItem`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SrvItem {
    pub index: i32,
    pub name: String,
    pub enable: i8,
    pub status: i8,
    pub cpu_threshold: i32,
    pub cpu_limit: i32,
    pub cpu_usage: i32,
    pub mem_threshold: i32,
    pub mem_limit: i32,
    pub mem_usage: i32,
    pub start_time: i64,
    pub logs_start_time: i64,
    pub logs_end_time: i64,
}

impl AppItem {
    /// Snapshot a task for a list reply.
    pub fn from_task(index: i32, task: &Task) -> Self {
        AppItem {
            index,
            name: task.name.clone(),
            version: task.version.clone(),
            hash: task.hash.clone(),
            srv_total: 1,
            srv_items: vec![SrvItem::from_task(0, task)],
            log_file: task.log_file.display().to_string(),
        }
    }
}

impl SrvItem {
    pub fn from_task(index: i32, task: &Task) -> Self {
        SrvItem {
            index,
            name: task.name.clone(),
            enable: task.enable as i8,
            status: task.status.as_i8(),
            cpu_threshold: task.cpu_threshold as i32,
            cpu_limit: task.cpu_limit as i32,
            cpu_usage: task.cpu_rate as i32,
            mem_threshold: task.mem_threshold as i32,
            mem_limit: task.mem_limit as i32,
            mem_usage: task.mem_rate as i32,
            start_time: task.start_time,
            logs_start_time: task.log_start_time,
            logs_end_time: task.log_end_time,
        }
    }
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Datagram too large: {size} bytes (max {max})")]
    DatagramTooLarge { size: usize, max: usize },
}

/// Encode one record as a datagram payload.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > MAX_DATAGRAM {
        return Err(ProtocolError::DatagramTooLarge {
            size: json.len(),
            max: MAX_DATAGRAM,
        });
    }
    Ok(json)
}

/// Decode a datagram payload.
pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
