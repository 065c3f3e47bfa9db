//! Reload broadcast to connected browser pages.
//!
//! Each open websocket registers a bounded sender. A broadcast walks a
//! snapshot of the registry: clients whose receiving side is gone are
//! skipped and pruned, the rest get one `reload` token via `try_send`.
//! There is no queueing for clients that connect later and no retry.

use std::collections::HashMap;
use std::sync::Arc;

use neutronium_compiler::RELOAD_MESSAGE;
use parking_lot::RwLock;
use tokio::sync::mpsc;

/// Pending tokens a slow client may buffer before sends start failing.
const CLIENT_BUFFER: usize = 8;

pub type ClientId = usize;

type ClientRegistry = Arc<RwLock<HashMap<ClientId, mpsc::Sender<&'static str>>>>;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients the token was handed to.
    pub sent: usize,
    /// Clients that were closed (or full) and got nothing.
    pub skipped: usize,
}

/// Registry of open reload connections.
#[derive(Debug, Clone, Default)]
pub struct ReloadChannel {
    clients: ClientRegistry,
    next_client_id: Arc<RwLock<ClientId>>,
}

impl ReloadChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client and return its id and token receiver.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<&'static str>) {
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);

        let id = {
            let mut next = self.next_client_id.write();
            let id = *next;
            *next += 1;
            id
        };

        self.clients.write().insert(id, tx);
        tracing::debug!("Reload client {} connected", id);
        (id, rx)
    }

    pub fn unregister(&self, id: ClientId) {
        if self.clients.write().remove(&id).is_some() {
            tracing::debug!("Reload client {} disconnected", id);
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Send one reload token to every open client.
    pub fn broadcast(&self) -> BroadcastReport {
        let snapshot: Vec<(ClientId, mpsc::Sender<&'static str>)> = self
            .clients
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for (id, tx) in snapshot {
            if tx.is_closed() {
                closed.push(id);
                report.skipped += 1;
                continue;
            }
            match tx.try_send(RELOAD_MESSAGE) {
                Ok(()) => report.sent += 1,
                Err(mpsc::error::TrySendError::Full(_)) => report.skipped += 1,
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    closed.push(id);
                    report.skipped += 1;
                }
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write();
            for id in closed {
                clients.remove(&id);
            }
        }

        report
    }

    /// Drop every sender so each connection task closes its socket.
    pub fn disconnect_all(&self) {
        self.clients.write().clear();
    }
}
