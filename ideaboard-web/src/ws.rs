use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use ideaboard_data::UpdateCursor;

use crate::state::{AppState, Snapshot};

/// Summary pushed to clients so they know to re-fetch `/api/ideas`.
#[derive(Debug, Serialize)]
pub struct IdeasUpdate {
    pub count: usize,
    pub latest_updated_at: Option<String>,
}

#[derive(Serialize)]
#[serde(tag = "type", content = "data")]
enum WsMessage {
    #[serde(rename = "ideas_updated")]
    IdeasUpdated(IdeasUpdate),
}

impl WsMessage {
    fn for_snapshot(snapshot: &Snapshot, cursor: &UpdateCursor) -> Self {
        WsMessage::IdeasUpdated(IdeasUpdate {
            count: snapshot.ideas.len(),
            latest_updated_at: cursor.last_seen().map(str::to_string),
        })
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe first so a reload racing the initial send is not lost
    let mut update_rx = state.subscribe();

    // Each connection tracks what it has already announced.
    let mut cursor = UpdateCursor::new();

    // Send initial state
    let snapshot = state.snapshot().await;
    cursor.observe(&snapshot.ideas);
    let msg = WsMessage::for_snapshot(&snapshot, &cursor);
    if let Ok(json) = serde_json::to_string(&msg) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    // Spawn a task to forward updates to the WebSocket
    let send_state = state.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            match update_rx.recv().await {
                // A lagged receiver only missed duplicate notifications.
                Ok(()) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
            let snapshot = send_state.snapshot().await;
            if !cursor.advance(&snapshot.ideas) {
                continue;
            }

            let msg = WsMessage::for_snapshot(&snapshot, &cursor);
            if let Ok(json) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Receive messages from the client (mainly for keepalive/close detection)
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }
}
