//! WebSocket upgrade endpoint and the per-connection read loop

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::hub::{ConnectionId, Hub};
use crate::state::AppState;

/// Why a read loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadLoopExit {
    /// Peer sent a close frame
    PeerClosed,
    /// Inbound stream ended without a close frame
    StreamEnded,
    /// Transport error while reading
    ReadError,
    /// Nothing arrived within the idle timeout
    IdleTimeout,
    /// The hub already dropped the connection, or a heartbeat ping failed
    Dropped,
}

/// WebSocket upgrade handler.
///
/// Requests that are not a valid upgrade are rejected by the extractor before
/// this runs, so nothing gets registered for them.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<Hub>) {
    let (sender, receiver) = socket.split();
    let conn_id = hub.connect(Box::new(sender));

    let exit = read_loop(&hub, conn_id, receiver).await;
    tracing::debug!(conn_id, ?exit, "Read loop finished");

    hub.disconnect(conn_id).await;
}

/// Consume inbound frames until the peer goes away.
///
/// Application payloads are discarded; only liveness matters. The loop also
/// pings the client through the hub every `ping_interval`, which doubles as a
/// check that the hub has not dropped the connection in the meantime.
pub async fn read_loop<S>(hub: &Hub, conn_id: ConnectionId, mut receiver: S) -> ReadLoopExit
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let config = hub.config().clone();

    let mut heartbeat =
        tokio::time::interval_at(Instant::now() + config.ping_interval, config.ping_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let idle = tokio::time::sleep(config.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            frame = receiver.next() => {
                idle.as_mut().reset(Instant::now() + config.idle_timeout);

                match frame {
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!(conn_id, "WebSocket closed by peer");
                        return ReadLoopExit::PeerClosed;
                    }
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(conn_id, len = text.len(), "Ignoring inbound text frame");
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(conn_id, len = data.len(), "Ignoring inbound binary frame");
                    }
                    // pings are answered by the protocol layer
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(conn_id, error = %e, "WebSocket read error");
                        return ReadLoopExit::ReadError;
                    }
                    None => return ReadLoopExit::StreamEnded,
                }
            }

            _ = heartbeat.tick() => {
                if let Err(e) = hub.ping(conn_id).await {
                    tracing::debug!(conn_id, error = %e, "Heartbeat failed");
                    return ReadLoopExit::Dropped;
                }
            }

            _ = &mut idle => {
                tracing::info!(conn_id, timeout = ?config.idle_timeout, "WebSocket idle, closing");
                return ReadLoopExit::IdleTimeout;
            }
        }
    }
}
