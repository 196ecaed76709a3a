// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers for the control channel.
//!
//! `dispatch` is the single entry point: it routes a decoded request to
//! its handler and collects the reply stream. Handlers never panic; every
//! failure is folded into a `(code, result)` reply.

mod control;
mod install;
mod query;

use crate::lifecycle::Daemon;
use crate::protocol::{ControlReply, ControlRequest};
use appctl_adapters::{ProcessAdapter, ResourceSampler, WarnNotifier};
use appctl_core::{Clock, CtlCommand};

pub(crate) fn dispatch<P, S, N, C>(
    daemon: &mut Daemon<P, S, N, C>,
    request: &ControlRequest,
) -> Vec<ControlReply>
where
    P: ProcessAdapter,
    S: ResourceSampler,
    N: WarnNotifier,
    C: Clock,
{
    match request.cmd {
        CtlCommand::Install => vec![install::handle_install(daemon, request)],

        CtlCommand::Start => vec![control::handle_start(daemon, request)],
        CtlCommand::Stop => vec![control::handle_stop(daemon, request)],
        CtlCommand::Enable => vec![control::handle_enable(daemon, request, 1)],
        CtlCommand::Disable => vec![control::handle_enable(daemon, request, 0)],
        CtlCommand::Rm => vec![control::handle_rm(daemon, request)],

        CtlCommand::ConfigCpuThreshold
        | CtlCommand::ConfigMemThreshold
        | CtlCommand::ConfigCpuLimit
        | CtlCommand::ConfigMemLimit => vec![control::handle_config(daemon, request)],

        CtlCommand::List => query::handle_list(daemon, request),
        CtlCommand::Version => vec![query::handle_version(daemon, request)],

        CtlCommand::QueryCpuThreshold
        | CtlCommand::QueryMemThreshold
        | CtlCommand::QueryCpuLimit
        | CtlCommand::QueryMemLimit => vec![query::handle_query(daemon, request)],

        CtlCommand::QueryAllResource => vec![query::handle_query_all(daemon, request)],
        CtlCommand::Logs => vec![query::handle_logs(daemon, request)],
    }
}

#[cfg(test)]
#[path = "../handlers_tests/mod.rs"]
mod tests;
