// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only commands: LIST, VERSION, QUERY_*, QUERY_ALL_RESOURCE, LOGS.

use crate::lifecycle::{Daemon, DAEMON_VERSION};
use crate::protocol::{
    AppItem, ControlReply, ControlRequest, CODE_FAILED, CODE_OK, LIST_CHUNK_SIZE, RESULT_FAILED,
    RESULT_FINISH,
};
use appctl_core::CtlCommand;

/// LIST with an empty name walks the whole table, flushing a reply every
/// [`LIST_CHUNK_SIZE`] items with `code = 1` and a final flush with
/// `code = 0, result = "Finish."`. Every chunk carries the grand total.
pub(crate) fn handle_list<P, S, N, C>(
    daemon: &Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> Vec<ControlReply> {
    let name = request.name.as_str();

    if !name.is_empty() {
        return match daemon.store.find(name) {
            Some(task) => vec![ControlReply {
                cmd: request.cmd,
                name: name.to_string(),
                code: CODE_OK,
                result: RESULT_FINISH.to_string(),
                total: 1,
                items: vec![AppItem::from_task(0, task)],
            }],
            None => vec![ControlReply::not_found(request.cmd, name)],
        };
    }

    let tasks = daemon.store.list();
    let total = tasks.len() as i32;
    let mut replies = Vec::new();
    let mut chunk: Vec<AppItem> = Vec::new();

    for (index, task) in tasks.iter().enumerate() {
        chunk.push(AppItem::from_task(index as i32, task));
        if chunk.len() == LIST_CHUNK_SIZE {
            replies.push(ControlReply {
                cmd: request.cmd,
                name: String::new(),
                code: CODE_FAILED, // more chunks follow
                result: String::new(),
                total,
                items: std::mem::take(&mut chunk),
            });
        }
    }

    replies.push(ControlReply {
        cmd: request.cmd,
        name: String::new(),
        code: CODE_OK,
        result: RESULT_FINISH.to_string(),
        total,
        items: chunk,
    });

    replies
}

/// VERSION answers the daemon's own version for the reserved name
/// "container".
pub(crate) fn handle_version<P, S, N, C>(
    _daemon: &Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply {
    if request.name == "container" {
        ControlReply::ok(request.cmd, &request.name, DAEMON_VERSION)
    } else {
        ControlReply::failed(request.cmd, &request.name, RESULT_FAILED)
    }
}

/// QUERY_*: one integer, returned as a decimal string.
pub(crate) fn handle_query<P, S, N, C>(
    daemon: &Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply {
    let name = request.name.as_str();
    let Some(task) = daemon.store.find(name) else {
        return ControlReply::failed(request.cmd, name, RESULT_FAILED);
    };

    let value = match request.cmd {
        CtlCommand::QueryCpuThreshold => task.cpu_threshold,
        CtlCommand::QueryMemThreshold => task.mem_threshold,
        CtlCommand::QueryCpuLimit => task.cpu_limit,
        CtlCommand::QueryMemLimit => task.mem_limit,
        _ => return ControlReply::failed(request.cmd, name, RESULT_FAILED),
    };
    ControlReply::ok(request.cmd, name, &value.to_string())
}

/// QUERY_ALL_RESOURCE: thresholds of every task as one JSON payload.
pub(crate) fn handle_query_all<P, S, N, C>(
    daemon: &Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply {
    let items: Vec<serde_json::Value> = daemon
        .store
        .list()
        .iter()
        .map(|task| {
            serde_json::json!({
                "name": task.name,
                "cputhreshold": task.cpu_threshold,
                "memthreshold": task.mem_threshold,
            })
        })
        .collect();
    let payload = serde_json::json!({ "items": items }).to_string();
    ControlReply::ok(request.cmd, &request.name, &payload)
}

/// LOGS: newline-joined event-log paths of every task.
pub(crate) fn handle_logs<P, S, N, C>(
    daemon: &Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> ControlReply {
    let listing = daemon
        .store
        .list()
        .iter()
        .map(|task| task.log_file.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    ControlReply::ok(request.cmd, &request.name, &listing)
}
