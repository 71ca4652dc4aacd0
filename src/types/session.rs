//! Session payload: the unit exchanged with storage, report and LLM

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::types::{MetricPoint, SessionEvent, Snapshot};

/// How the session was driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Fixed task (video) inside the session
    #[default]
    Task,
    /// Free activity tracking with screen snapshots
    Activity,
}

/// Task descriptor carried by task-mode sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub seconds: u32,
    pub source: String,
}

/// Complete session record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub mode: SessionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<TaskInfo>,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
    #[serde(default)]
    pub points: Vec<MetricPoint>,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SessionPayload {
    /// Empty payload starting now
    pub fn new(mode: SessionMode) -> Self {
        Self::started_at(mode, Utc::now())
    }

    /// Empty payload with an explicit start time
    pub fn started_at(mode: SessionMode, started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            mode,
            task: None,
            events: Vec::new(),
            points: Vec::new(),
            snapshots: Vec::new(),
            notes: None,
        }
    }

    /// Timestamp of the last recorded point
    pub fn last_timestamp(&self) -> Option<f64> {
        self.points.last().map(|p| p.timestamp)
    }

    /// Session length covered by points (seconds)
    pub fn duration_secs(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}
