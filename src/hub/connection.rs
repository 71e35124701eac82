//! Outbound half of a client connection.
//!
//! The hub never touches a socket directly. Everything it writes goes through a
//! [`MessageSink`], and every write is bounded by a deadline so a stalled peer
//! can only ever cost one deadline per attempt.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::sink::SinkExt;
use futures::stream::SplitSink;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{ConnectionId, HubError};

/// Something the hub can push text frames into.
#[async_trait]
pub trait MessageSink: Send {
    /// Write one text frame
    async fn send_text(&mut self, text: &str) -> Result<(), HubError>;

    /// Write a heartbeat ping
    async fn send_ping(&mut self) -> Result<(), HubError>;

    /// Send a close frame and release the transport
    async fn close(&mut self) -> Result<(), HubError>;
}

#[async_trait]
impl MessageSink for SplitSink<WebSocket, Message> {
    async fn send_text(&mut self, text: &str) -> Result<(), HubError> {
        self.send(Message::Text(text.into()))
            .await
            .map_err(|e| HubError::Transport(e.to_string()))
    }

    async fn send_ping(&mut self) -> Result<(), HubError> {
        self.send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| HubError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), HubError> {
        SinkExt::close(self)
            .await
            .map_err(|e| HubError::Transport(e.to_string()))
    }
}

/// A registered client.
///
/// Writes are serialized through a fair async mutex, so two writes issued one
/// after the other reach the peer in that order.
pub struct ClientConnection {
    id: ConnectionId,
    sink: Mutex<Box<dyn MessageSink>>,
}

impl ClientConnection {
    pub(crate) fn new(id: ConnectionId, sink: Box<dyn MessageSink>) -> Self {
        Self {
            id,
            sink: Mutex::new(sink),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Write a text frame. The deadline covers waiting for the write lock too.
    pub async fn send_text(&self, text: &str, deadline: Duration) -> Result<(), HubError> {
        tokio::time::timeout(deadline, async {
            self.sink.lock().await.send_text(text).await
        })
        .await
        .map_err(|_| HubError::WriteTimeout(deadline))?
    }

    pub async fn ping(&self, deadline: Duration) -> Result<(), HubError> {
        tokio::time::timeout(deadline, async { self.sink.lock().await.send_ping().await })
            .await
            .map_err(|_| HubError::WriteTimeout(deadline))?
    }

    pub async fn close(&self, deadline: Duration) -> Result<(), HubError> {
        tokio::time::timeout(deadline, async { self.sink.lock().await.close().await })
            .await
            .map_err(|_| HubError::WriteTimeout(deadline))?
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
