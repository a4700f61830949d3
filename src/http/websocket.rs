//! WebSocket endpoint.
//!
//! # Responsibilities
//! - Complete the upgrade handshake
//! - Register the connection under the `{key}` path parameter
//! - Forward outbound messages queued by application code
//! - Report the connection closed once the socket ends
//!
//! # Data Flow
//! ```text
//! application code ──send_text──▶ mpsc queue ──▶ writer task ──▶ client
//! client ──frames──▶ reader loop (close / error ends the connection)
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::http::server::AppState;
use crate::ws::{Connection, ConnectionError, ConnectionRegistry};

/// Handle to one upgraded WebSocket, as tracked by the registry.
#[derive(Debug)]
pub struct WsConnection {
    id: Uuid,
    key: String,
    outbound: mpsc::UnboundedSender<Message>,
    closed: AtomicBool,
}

impl WsConnection {
    pub fn new(key: impl Into<String>, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            outbound,
            closed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue a text frame for the client.
    pub fn send_text(&self, text: &str) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        self.outbound
            .send(Message::Text(text.to_owned().into()))
            .map_err(|_| ConnectionError::Closed)
    }

    fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

impl Connection for WsConnection {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.outbound.is_closed()
    }

    /// Send a close frame; the writer task ends after flushing it.
    fn destroy(&self) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Ok(());
        }
        self.mark_closed();
        self.outbound
            .send(Message::Close(None))
            .map_err(|_| ConnectionError::Closed)
    }
}

/// Upgrade handler mounted at the configured WebSocket path.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(params): Path<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Response {
    let Some(key) = params.get("key").cloned() else {
        return (StatusCode::BAD_REQUEST, "Missing connection key").into_response();
    };

    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, key, registry))
}

async fn handle_socket(socket: WebSocket, key: String, registry: Arc<ConnectionRegistry<WsConnection>>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let conn = Arc::new(WsConnection::new(key.clone(), tx));
    tracing::debug!(key = %key, connection_id = %conn.id(), "WebSocket connected");
    registry.register(key.clone(), conn.clone());

    let mut writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(msg)) => {
                    tracing::trace!(connection_id = %conn.id(), ?msg, "Inbound frame ignored");
                }
            },
            _ = &mut writer => break,
        }
    }

    conn.mark_closed();
    writer.abort();
    tracing::debug!(key = %key, connection_id = %conn.id(), "WebSocket disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_and_destroy() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = WsConnection::new("room", tx);
        assert_eq!(conn.key(), "room");

        conn.send_text("hello").unwrap();
        assert!(matches!(rx.try_recv(), Ok(Message::Text(t)) if t.as_str() == "hello"));

        conn.destroy().unwrap();
        assert!(conn.is_closed());
        assert!(matches!(rx.try_recv(), Ok(Message::Close(None))));
        assert!(matches!(conn.send_text("late"), Err(ConnectionError::Closed)));
    }

    #[test]
    fn test_closed_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection::new("room", tx);
        assert!(!conn.is_closed());
        drop(rx);
        assert!(conn.is_closed());
        // Already gone: teardown is a no-op.
        assert!(conn.destroy().is_ok());
    }
}
