//! Optional turn-by-turn status events, broadcast to any subscriber —
//! grounded on `status_stream.rs`'s `StatusStream` (`broadcast::Sender` +
//! `subscribe()`), narrowed to the events a scheduler run actually produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnEvent {
    pub session_id: String,
    pub turn: u32,
    pub agent: String,
    pub kind: TurnEventKind,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEventKind {
    RunStarted,
    ToolInvoked { name: String },
    ToolFailed { name: String, reason: String },
    HandoffTo { target: String },
    HandoffRejected { target: String },
    Responded,
    RunFailed { reason: String },
}

pub struct EventStream {
    sender: broadcast::Sender<TurnEvent>,
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStream {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub fn emit(&self, event: TurnEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TurnEvent> {
        self.sender.subscribe()
    }
}
