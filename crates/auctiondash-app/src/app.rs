// Application state and the request loop.
//
// The loop is the only owner of the dashboard. It takes one WebSocket event
// at a time and runs the matching refresh to completion before looking at
// the next, so no two recomputations ever overlap.

use auctiondash_core::dashboard::Dashboard;
use auctiondash_core::filter::FilterSelection;
use auctiondash_core::protocol::{now_millis, ClientMessage, ServerMessage, SnapshotPayload};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::ws_server::WsEvent;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    dashboard: Dashboard,
    title: String,
    /// Pages currently connected; only used for logging.
    connections: usize,
}

impl AppState {
    pub fn new(dashboard: Dashboard, title: impl Into<String>) -> Self {
        Self {
            dashboard,
            title: title.into(),
            connections: 0,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections
    }

    /// The first message of every connection: options plus unfiltered output.
    pub fn snapshot(&self) -> ServerMessage {
        ServerMessage::Snapshot {
            timestamp: now_millis(),
            payload: SnapshotPayload {
                title: self.title.clone(),
                options: self.dashboard.options().clone(),
                output: self.dashboard.refresh(&FilterSelection::overall()),
            },
        }
    }

    /// Answer one raw message from a page.
    pub fn handle_message(&self, addr: &str, text: &str) -> ServerMessage {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Failed to parse message from {addr}: {e}");
                return ServerMessage::Error {
                    timestamp: now_millis(),
                    message: format!("invalid message: {e}"),
                };
            }
        };

        match msg {
            ClientMessage::FilterChanged { payload } => {
                debug!("Filter change from {addr}: {payload:?}");
                ServerMessage::Refresh {
                    timestamp: now_millis(),
                    payload: self.dashboard.refresh(&payload),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the request loop until every WebSocket sender is gone.
pub async fn run(mut ws_rx: mpsc::Receiver<WsEvent>, mut state: AppState) -> anyhow::Result<()> {
    info!("Application event loop started");

    while let Some(event) = ws_rx.recv().await {
        match event {
            WsEvent::Connected { addr, reply } => {
                state.connections += 1;
                info!("Page connected from {addr} ({} open)", state.connections);
                if reply.send(state.snapshot()).is_err() {
                    debug!("{addr} went away before its snapshot was sent");
                }
            }
            WsEvent::Message { addr, text, reply } => {
                if reply.send(state.handle_message(&addr, &text)).is_err() {
                    debug!("{addr} went away before its refresh was sent");
                }
            }
            WsEvent::Disconnected { addr } => {
                state.connections = state.connections.saturating_sub(1);
                info!("Page disconnected from {addr} ({} open)", state.connections);
            }
        }
    }

    info!("WebSocket channel closed, application loop exiting");
    Ok(())
}
