// Messages exchanged with the dashboard page over the WebSocket.

use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardOutput;
use crate::filter::{FilterOptions, FilterSelection};

// ---------------------------------------------------------------------------
// Page -> server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// One of the dropdowns changed; carries all three current values.
    FilterChanged { payload: FilterSelection },
}

// ---------------------------------------------------------------------------
// Server -> page
// ---------------------------------------------------------------------------

/// Sent once per connection before any refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub title: String,
    pub options: FilterOptions,
    pub output: DashboardOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Snapshot {
        timestamp: i64,
        payload: SnapshotPayload,
    },
    Refresh {
        timestamp: i64,
        payload: DashboardOutput,
    },
    Error {
        timestamp: i64,
        message: String,
    },
}

/// Milliseconds since the Unix epoch, stamped on outgoing messages.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
