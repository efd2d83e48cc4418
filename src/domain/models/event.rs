//! Incoming event domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An incoming fact delivered to the manager and routed to schedules.
///
/// Events are immutable after ingestion; `received_at` is stamped by the
/// boundary (HTTP handler or startup replay), not supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    pub received_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            payload,
            received_at: Utc::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
