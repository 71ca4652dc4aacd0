//! Core types for Inshight

mod gaze;
mod emotion;
mod sample;
mod metric;
mod event;
mod snapshot;
mod session;
mod report;

pub use gaze::GazeZone;
pub use emotion::Emotion;
pub use sample::{Landmark, FeatureSample};
pub use metric::MetricPoint;
pub use event::{EventKind, SessionEvent, task_window};
pub use snapshot::{Snapshot, SnapshotKind, CaptureResult, CaptureReason, CONFUSION_LABEL};
pub use session::{SessionMode, SessionPayload, TaskInfo};
pub use report::{Report, Scores, Tone, Moments, StressMoment, EngagementMoment};
