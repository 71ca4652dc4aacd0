//! Session event log entries

use serde::{Deserialize, Serialize};

/// What happened at an event timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskStart,
    TaskEnd,
    ActivityStart,
    ActivityEnd,
    Spike,
}

impl EventKind {
    /// Opens the sampling window
    pub fn opens_session(&self) -> bool {
        matches!(self, EventKind::TaskStart | EventKind::ActivityStart)
    }

    /// Closes the sampling window
    pub fn closes_session(&self) -> bool {
        matches!(self, EventKind::TaskEnd | EventKind::ActivityEnd)
    }
}

/// One append-only log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "t")]
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SessionEvent {
    pub fn new(timestamp: f64, kind: EventKind) -> Self {
        Self {
            timestamp,
            kind,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Task-active window `[task_start, task_end]` taken from the first of each
///
/// Returns `None` unless both bounds are present.
pub fn task_window(events: &[SessionEvent]) -> Option<(f64, f64)> {
    let start = events.iter().find(|e| e.kind == EventKind::TaskStart)?.timestamp;
    let end = events.iter().find(|e| e.kind == EventKind::TaskEnd)?.timestamp;
    Some((start, end))
}
