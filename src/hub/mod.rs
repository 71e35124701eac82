//! Real-time notification hub
//!
//! Owns the registry of connected WebSocket clients and fans task events out
//! to them. One `Hub` is built at startup and shared as `Arc<Hub>` between the
//! upgrade handler and the HTTP handlers that produce events.

mod broadcast;
pub mod connection;
pub mod registry;

use std::time::Duration;

use crate::config::HubConfig;

pub use broadcast::BroadcastReport;
pub use connection::{ClientConnection, MessageSink};
pub use registry::ConnectionRegistry;

/// Identity assigned to a connection at registration
pub type ConnectionId = u64;

/// Errors on the outbound write path
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection is no longer registered")]
    Closed,
}

pub struct Hub {
    registry: ConnectionRegistry,
    config: HubConfig,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            config: config.bounded(),
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Register the outbound half of a freshly upgraded socket
    pub fn connect(&self, sink: Box<dyn MessageSink>) -> ConnectionId {
        let id = self.registry.register(sink);
        tracing::info!(conn_id = id, active = self.registry.len(), "Client connected");
        id
    }

    /// Unregister a connection and release its sink.
    ///
    /// Returns false if the connection was already gone; in that case whoever
    /// removed it first has done (or is doing) the release.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let Some(conn) = self.registry.unregister(id) else {
            return false;
        };

        if let Err(e) = conn.close(self.config.write_timeout).await {
            tracing::debug!(conn_id = id, error = %e, "Close after unregister failed");
        }

        tracing::info!(
            conn_id = id,
            active = self.registry.len(),
            "Client disconnected"
        );
        true
    }

    /// Send a heartbeat ping to a registered connection
    pub async fn ping(&self, id: ConnectionId) -> Result<(), HubError> {
        let conn = self.registry.get(id).ok_or(HubError::Closed)?;
        conn.ping(self.config.write_timeout).await
    }

    /// Drop every connection, closing each within the write deadline
    pub async fn shutdown(&self) {
        let conns = self.registry.drain();
        if conns.is_empty() {
            return;
        }

        tracing::info!(count = conns.len(), "Closing client connections");
        let deadline = self.config.write_timeout;
        futures::future::join_all(conns.iter().map(|conn| async move {
            if let Err(e) = conn.close(deadline).await {
                tracing::debug!(conn_id = conn.id(), error = %e, "Close during shutdown failed");
            }
        }))
        .await;
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}
