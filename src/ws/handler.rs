use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::ClientMessage;
use crate::state::AppState;
use crate::ws::events;

/// WebSocket handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection for its whole lifetime.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    // Opaque session id, generated at connection accept.
    let session_id = Uuid::new_v4().to_string();
    info!("Session connected: {}", session_id);

    let (mut sender, mut receiver) = socket.split();

    // Per-session outbound queue. The registry pushes events here; the writer
    // task below drains them onto the socket in FIFO order.
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.register(&session_id, tx).await;

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Reader task: parse incoming events and dispatch them. Non-text frames
    // and parse failures are skipped; the loop ends when the stream closes.
    let recv_state = state.clone();
    let recv_session = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(Message::Text(text))) = receiver.next().await {
            let msg: ClientMessage = match serde_json::from_str(&text) {
                Ok(msg) => msg,
                Err(e) => {
                    error!("Failed to parse message from {}: {}", recv_session, e);
                    continue;
                }
            };
            dispatch(&recv_state, &recv_session, msg).await;
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Transport is gone: leave every joined room and notify the remaining
    // members of each.
    events::handle_disconnect(&state, &session_id).await;
    info!("Session disconnected: {}", session_id);
}

/// Route one client event to its handler.
async fn dispatch(state: &AppState, session_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinDocument(msg) => events::handle_join(state, session_id, msg).await,
        ClientMessage::TextChange(msg) => events::handle_text_change(state, session_id, msg).await,
        ClientMessage::CursorPosition(msg) => events::handle_cursor(state, session_id, msg).await,
        ClientMessage::SelectionChange(msg) => {
            events::handle_selection(state, session_id, msg).await
        }
    }
}
