// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket endpoint for realtime console updates.
//!
//! Every connection receives the desk-wide lifecycle stream (new cases,
//! assignments, closures). Message traffic is opt-in per case:
//!
//! Client -> Server (JSON):
//! ```json
//! {"type": "subscribe_case", "case_id": 7}
//! {"type": "unsubscribe_case", "case_id": 7}
//! ```
//!
//! Server -> Client: serialized bus events, e.g.
//! ```json
//! {"type": "case_opened", "case": {...}}
//! {"type": "message_appended", "message": {...}}
//! {"type": "delivery_failed", "case_id": 7, "message_id": 21}
//! ```

use std::collections::HashMap;

use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use linedesk_bus::DeskEvent;
use linedesk_core::types::CaseId;

use crate::server::ConsoleState;

/// Handshake query parameters. The session token travels in the query
/// string because browsers cannot set headers on WebSocket upgrades.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// Commands a connected console sends over the socket.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    SubscribeCase { case_id: i64 },
    UnsubscribeCase { case_id: i64 },
}

/// WebSocket upgrade handler. Rejects the handshake outright when the
/// token does not resolve to a session (fail-closed).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<ConsoleState>,
) -> Response {
    match state.sessions.resolve(&query.token) {
        Some(identity) => {
            debug!(username = %identity.username, "ws session opened");
            ws.on_upgrade(move |socket| handle_socket(socket, state))
                .into_response()
        }
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// Handle an individual WebSocket connection.
///
/// One mpsc channel serializes everything going out; one forwarder task
/// per subscribed stream feeds it. The desk stream forwarder runs for
/// the whole connection; case stream forwarders come and go with
/// subscribe/unsubscribe commands.
async fn handle_socket(socket: WebSocket, state: ConsoleState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(64);

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    let desk_task = spawn_forwarder(state.bus.subscribe_desk(), tx.clone());
    let mut case_tasks: HashMap<i64, JoinHandle<()>> = HashMap::new();

    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => {
                let text_str: &str = &text;
                let command: WsCommand = match serde_json::from_str(text_str) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!("invalid ws command: {e}");
                        continue;
                    }
                };
                match command {
                    WsCommand::SubscribeCase { case_id } => {
                        case_tasks.entry(case_id).or_insert_with(|| {
                            spawn_forwarder(
                                state.bus.subscribe_case(CaseId(case_id)),
                                tx.clone(),
                            )
                        });
                    }
                    WsCommand::UnsubscribeCase { case_id } => {
                        if let Some(task) = case_tasks.remove(&case_id) {
                            task.abort();
                        }
                    }
                }
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary; ping/pong handled by the protocol layer
        }
    }

    // Cleanup.
    for task in case_tasks.into_values() {
        task.abort();
    }
    desk_task.abort();
    sender_task.abort();
}

/// Forward a broadcast stream into the connection's outbound queue as
/// JSON. Lagging only skips the overwritten events; the stream continues.
fn spawn_forwarder(
    mut events: broadcast::Receiver<DeskEvent>,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!("failed to serialize desk event: {e}");
                            continue;
                        }
                    };
                    if tx.send(payload).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "ws subscriber lagging, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
