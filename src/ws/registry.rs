//! Registry of active WebSocket connections.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::observability::metrics;

/// Opaque identifier for a registered connection.
pub type ConnectionId = Uuid;

/// Holds the outbound sender for every open WebSocket connection.
///
/// Broadcasting iterates a snapshot of the current senders; connections whose
/// send fails are collected and unregistered only after the iteration
/// completes.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound sender, returning its id.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> ConnectionId {
        let id = Uuid::new_v4();
        let count = {
            let mut connections = self.connections.lock().expect("registry mutex poisoned");
            connections.insert(id, sender);
            connections.len()
        };
        metrics::set_ws_connections(count);
        tracing::debug!(connection_id = %id, active = count, "Connection registered");
        id
    }

    /// Remove a connection. Returns false if it was already gone.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let (removed, count) = {
            let mut connections = self.connections.lock().expect("registry mutex poisoned");
            (connections.remove(&id).is_some(), connections.len())
        };
        if removed {
            metrics::set_ws_connections(count);
            tracing::debug!(connection_id = %id, active = count, "Connection unregistered");
        }
        removed
    }

    /// Number of currently registered connections.
    pub fn len(&self) -> usize {
        self.connections.lock().expect("registry mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fan a text frame out to every registered connection.
    ///
    /// Returns the number of successful deliveries. A failed send marks that
    /// connection for removal; it never aborts delivery to the rest.
    pub fn broadcast(&self, message: &str) -> usize {
        let snapshot: Vec<(ConnectionId, mpsc::UnboundedSender<String>)> = {
            let connections = self.connections.lock().expect("registry mutex poisoned");
            connections
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for (id, tx) in snapshot {
            if tx.send(message.to_string()).is_ok() {
                delivered += 1;
            } else {
                stale.push(id);
            }
        }

        for id in stale {
            tracing::debug!(connection_id = %id, "Dropping connection after failed send");
            self.unregister(id);
        }

        delivered
    }
}
