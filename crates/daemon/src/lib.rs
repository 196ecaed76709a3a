// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! appctl daemon library
//!
//! This module exposes the control protocol types for use by CLI clients.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod protocol;

pub use protocol::{
    AppItem, ControlReply, ControlRequest, ProtocolError, SrvItem, CODE_FAILED, CODE_NOT_FOUND,
    CODE_OK, LIST_CHUNK_SIZE, MAX_DATAGRAM,
};
