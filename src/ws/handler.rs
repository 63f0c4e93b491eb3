//! WebSocket connection handler.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::http::response::iso_timestamp;
use crate::http::server::AppState;
use crate::ws::registry::ConnectionId;

/// Inbound chat frame from a client.
#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(default)]
    content: String,
    user: Option<String>,
}

/// Outbound frame broadcast to every registered connection.
#[derive(Debug, Serialize)]
struct OutboundFrame {
    r#type: &'static str,
    content: String,
    user: String,
    timestamp: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Pushes broadcast frames from the connection's channel into its socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    let id: ConnectionId = state.registry.register(tx);

    let mut send_task = pusher_loop(rx, sender);

    let registry = state.registry.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!(connection_id = %id, error = %e, "WebSocket read error");
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    let frame = match serde_json::from_str::<InboundFrame>(text.as_str()) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(connection_id = %id, error = %e, "Discarding malformed frame");
                            continue;
                        }
                    };

                    let outbound = OutboundFrame {
                        r#type: "message",
                        content: frame.content,
                        user: frame.user.unwrap_or_else(|| "anonymous".to_string()),
                        timestamp: iso_timestamp(),
                    };

                    // Echo pattern: the sender is registered too, so it
                    // receives its own broadcast.
                    match serde_json::to_string(&outbound) {
                        Ok(json) => {
                            registry.broadcast(&json);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize outbound frame");
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::debug!(connection_id = %id, "Client requested close");
                    break;
                }
                // Ping/pong is answered by the protocol layer.
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the connection down.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    }

    state.registry.unregister(id);
}
