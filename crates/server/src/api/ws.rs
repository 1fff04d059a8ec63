//! WebSocket support for live replay list updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use replaylink_core::{ItemEvent, ReplayItem, StatusCounts};

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// WebSocket message sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A replay was discovered.
    ReplayAdded { item: ReplayItem },
    /// A replay changed status or was flagged deleted.
    ReplayUpdated { item: ReplayItem },
    /// A replay left the list.
    ReplayRemoved { path: PathBuf },
    /// Per-status totals after a change.
    Counts { counts: StatusCounts },
    /// The manager was started or stopped.
    ManagerStatus { running: bool },
    /// Keep-alive.
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::ReplayAdded { .. } => "replay_added",
            WsMessage::ReplayUpdated { .. } => "replay_updated",
            WsMessage::ReplayRemoved { .. } => "replay_removed",
            WsMessage::Counts { .. } => "counts",
            WsMessage::ManagerStatus { .. } => "manager_status",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

impl From<ItemEvent> for WsMessage {
    fn from(event: ItemEvent) -> Self {
        match event {
            ItemEvent::Added { item } => WsMessage::ReplayAdded { item },
            ItemEvent::Updated { item } => WsMessage::ReplayUpdated { item },
            ItemEvent::Removed { path } => WsMessage::ReplayRemoved { path },
            ItemEvent::Counts { counts } => WsMessage::Counts { counts },
        }
    }
}

/// Fan-out of [`WsMessage`]s to every connected client.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn broadcast(&self, msg: WsMessage) {
        // No receivers just means no client is connected.
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn manager_status(&self, running: bool) {
        self.broadcast(WsMessage::ManagerStatus { running });
    }

    /// Relays collection changes to clients until the source closes.
    pub fn forward(&self, mut events: broadcast::Receiver<ItemEvent>) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => broadcaster.broadcast(event.into()),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Replay event relay lagged, skipped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("Replay event relay stopped");
        })
    }

    /// Sends a heartbeat every `interval`.
    pub fn spawn_heartbeat(&self, interval: Duration) -> JoinHandle<()> {
        let broadcaster = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                broadcaster.broadcast(WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                });
            }
        })
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();
    info!("WebSocket client connected");

    // Current totals first so a fresh client can render immediately.
    let initial = WsMessage::Counts {
        counts: state.manager().counts().await,
    };

    let send_task = tokio::spawn(async move {
        let mut pending = Some(initial);
        loop {
            let msg = match pending.take() {
                Some(msg) => msg,
                None => match rx.recv().await {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => error!("Failed to serialize WsMessage: {}", e),
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => debug!("Ignoring client message: {}", text),
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
