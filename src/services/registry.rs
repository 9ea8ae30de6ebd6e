//! Registry of currently attached listener connections.
//!
//! Each connection gets a bounded outbound queue; the WebSocket writer task
//! drains the receiving end, so enqueueing a broadcast never blocks on a
//! slow listener. The registry has its own lock, independent of the session
//! coordinator's, and neither is ever held while acquiring the other.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Opaque handle to one attached listener.
pub type ConnectionId = Uuid;

pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, mpsc::Sender<String>>>,
    queue_capacity: usize,
}

impl ConnectionRegistry {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            queue_capacity,
        }
    }

    /// Registers a new listener and returns its handle together with the
    /// read end of its outbound queue. Attaching triggers no announcement;
    /// the listener asks for current state itself.
    pub async fn attach(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.connections.lock().await.insert(id, tx);
        debug!(connection = %id, "listener attached");
        (id, rx)
    }

    /// Removes a connection. Idempotent: detaching an already-detached
    /// handle is a no-op, which tolerates the race between the read loop's
    /// failure path and a broadcast-side drop.
    pub async fn detach(&self, id: ConnectionId) -> bool {
        let removed = self.connections.lock().await.remove(&id).is_some();
        if removed {
            debug!(connection = %id, "listener detached");
        }
        removed
    }

    /// Visits every attached connection in unspecified order. The registry
    /// lock is held for the full pass, keeping the observed set stable
    /// during one broadcast. The visitor must not block and must not detach;
    /// callers collect failures and detach after the pass.
    pub async fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(ConnectionId, &mpsc::Sender<String>),
    {
        let connections = self.connections.lock().await;
        for (id, tx) in connections.iter() {
            visitor(*id, tx);
        }
    }

    /// Outbound queue of one connection, if still attached.
    pub async fn sender_of(&self, id: ConnectionId) -> Option<mpsc::Sender<String>> {
        self.connections.lock().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Drops every outbound queue, which ends each connection's writer task
    /// and closes its socket. Used on shutdown.
    pub async fn clear(&self) {
        self.connections.lock().await.clear();
    }
}
