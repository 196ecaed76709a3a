// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control command catalog.
//!
//! The integer discriminants are the wire contract shared with the CLI:
//! the order is fixed and new commands append at the end.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CtlCommand {
    Install = 1,
    Start = 2,
    Stop = 3,
    Enable = 4,
    Disable = 5,
    Rm = 6,
    List = 7,
    Version = 8,
    ConfigCpuThreshold = 9,
    ConfigMemThreshold = 10,
    QueryCpuThreshold = 11,
    QueryMemThreshold = 12,
    ConfigCpuLimit = 13,
    ConfigMemLimit = 14,
    QueryCpuLimit = 15,
    QueryMemLimit = 16,
    QueryAllResource = 17,
    Logs = 18,
}

impl CtlCommand {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(CtlCommand::Install),
            2 => Some(CtlCommand::Start),
            3 => Some(CtlCommand::Stop),
            4 => Some(CtlCommand::Enable),
            5 => Some(CtlCommand::Disable),
            6 => Some(CtlCommand::Rm),
            7 => Some(CtlCommand::List),
            8 => Some(CtlCommand::Version),
            9 => Some(CtlCommand::ConfigCpuThreshold),
            10 => Some(CtlCommand::ConfigMemThreshold),
            11 => Some(CtlCommand::QueryCpuThreshold),
            12 => Some(CtlCommand::QueryMemThreshold),
            13 => Some(CtlCommand::ConfigCpuLimit),
            14 => Some(CtlCommand::ConfigMemLimit),
            15 => Some(CtlCommand::QueryCpuLimit),
            16 => Some(CtlCommand::QueryMemLimit),
            17 => Some(CtlCommand::QueryAllResource),
            18 => Some(CtlCommand::Logs),
            _ => None,
        }
    }
}

impl fmt::Display for CtlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CtlCommand::Install => "install",
            CtlCommand::Start => "start",
            CtlCommand::Stop => "stop",
            CtlCommand::Enable => "enable",
            CtlCommand::Disable => "disable",
            CtlCommand::Rm => "rm",
            CtlCommand::List => "list",
            CtlCommand::Version => "version",
            CtlCommand::ConfigCpuThreshold => "config-cpu-threshold",
            CtlCommand::ConfigMemThreshold => "config-mem-threshold",
            CtlCommand::QueryCpuThreshold => "query-cpu-threshold",
            CtlCommand::QueryMemThreshold => "query-mem-threshold",
            CtlCommand::ConfigCpuLimit => "config-cpu-limit",
            CtlCommand::ConfigMemLimit => "config-mem-limit",
            CtlCommand::QueryCpuLimit => "query-cpu-limit",
            CtlCommand::QueryMemLimit => "query-mem-limit",
            CtlCommand::QueryAllResource => "query-all-resource",
            CtlCommand::Logs => "logs",
        };
        write!(f, "{}", name)
    }
}

impl serde::Serialize for CtlCommand {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> serde::Deserialize<'de> for CtlCommand {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        CtlCommand::from_u8(value).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown control command: {}", value))
        })
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
