use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::connection::{ClientConnection, MessageSink};
use super::ConnectionId;

/// The set of live connections.
///
/// Every critical section here is a plain map operation; the lock is never
/// held across an await, so slow sockets cannot stall registration.
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Arc<ClientConnection>>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Insert a new connection and hand back its identity
    pub fn register(&self, sink: Box<dyn MessageSink>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let conn = Arc::new(ClientConnection::new(id, sink));
        self.connections.lock().insert(id, conn);
        id
    }

    /// Remove a connection.
    ///
    /// Returns the connection only to the caller that actually removed it;
    /// that caller owns releasing it. Later calls for the same id get `None`.
    pub fn unregister(&self, id: ConnectionId) -> Option<Arc<ClientConnection>> {
        self.connections.lock().remove(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<Arc<ClientConnection>> {
        self.connections.lock().get(&id).cloned()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(&id)
    }

    /// Point-in-time copy of the registered connections, ordered by id
    pub fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        let mut conns: Vec<_> = self.connections.lock().values().cloned().collect();
        conns.sort_by_key(|c| c.id());
        conns
    }

    /// Remove everything, returning what was registered
    pub fn drain(&self) -> Vec<Arc<ClientConnection>> {
        let mut conns: Vec<_> = self.connections.lock().drain().map(|(_, c)| c).collect();
        conns.sort_by_key(|c| c.id());
        conns
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
