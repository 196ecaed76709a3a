// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket reader task.
//!
//! The listener owns the receive side of the control socket: it blocks on
//! `recv_from`, decodes each datagram, and pushes the request onto a
//! bounded queue for the engine loop. Replies travel the other way — the
//! engine loop is the only writer of the socket.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::UnixDatagram;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::protocol::{self, ControlRequest, MAX_DATAGRAM};

/// Capacity of the request queue between reader and engine loop.
pub(crate) const REQUEST_QUEUE_CAPACITY: usize = 50;

/// One decoded request plus the client address to answer.
#[derive(Debug)]
pub(crate) struct ClientRequest {
    pub request: ControlRequest,
    pub client: PathBuf,
}

pub(crate) struct Listener {
    socket: Arc<UnixDatagram>,
    tx: mpsc::Sender<ClientRequest>,
}

impl Listener {
    pub fn new(socket: Arc<UnixDatagram>, tx: mpsc::Sender<ClientRequest>) -> Self {
        Self { socket, tx }
    }

    /// Run until the socket errors or the engine loop goes away. Either
    /// way the sender drops, the queue closes, and the daemon shuts down.
    pub async fn run(self) {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (size, addr) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    error!("recv error: {}", e);
                    break;
                }
            };

            // Replies go to the client's own bound socket path; an unbound
            // (anonymous) sender has no reply address at all.
            let Some(client) = addr.as_pathname().map(|p| p.to_path_buf()) else {
                warn!("dropping datagram from unnamed client socket");
                continue;
            };

            let request: ControlRequest = match protocol::decode(&buf[..size]) {
                Ok(request) => request,
                Err(e) => {
                    warn!(client = %client.display(), error = %e, "undecodable request");
                    continue;
                }
            };

            debug!(cmd = %request.cmd, name = %request.name, "received request");

            if self.tx.send(ClientRequest { request, client }).await.is_err() {
                break; // engine loop gone
            }
        }
    }
}
