//! WebSocket endpoint: one persistent duplex channel per listener.
//!
//! Each connection runs a read loop feeding inbound events into the session
//! coordinator, plus a writer task draining the connection's bounded
//! outbound queue into the socket. A protocol error ends only that
//! listener's loops and detaches its connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::sink::SinkExt;
use futures::stream::StreamExt;
use tracing::{info, warn};

use crate::api::AppState;
use crate::models::{InboundEvent, ParseError};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (connection, mut outbound_rx) = state.registry.attach().await;

    info!(connection = %connection, "listener connected");

    // Writer: drains the bounded outbound queue. Ends when the registry
    // drops the sender (detach) or the socket rejects a send.
    let writer = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    // Read loop: the only producer of this listener's inbound events.
    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(text)) => match InboundEvent::parse(&text) {
                Ok(event) => state.coordinator.handle_event(connection, event).await,
                Err(ParseError::UnknownCommand(command)) => {
                    warn!(connection = %connection, command, "ignoring unknown command");
                }
                Err(ParseError::Malformed(e)) => {
                    warn!(connection = %connection, error = %e, "malformed message, closing");
                    break;
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            // Pings are answered by axum; binary frames are not part of the
            // protocol.
            _ => {}
        }
    }

    state.registry.detach(connection).await;
    writer.abort();
    info!(connection = %connection, "listener disconnected");
}
