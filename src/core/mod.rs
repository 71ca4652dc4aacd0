//! Core modules for Inshight

pub mod features;
pub mod emotion;
pub mod engagement;
pub mod confusion;
pub mod capture;
pub mod sampler;
pub mod runner;
pub mod report;
pub mod analytics;
pub mod replay;
pub mod store;
pub mod ask;
pub mod api;

pub use features::FeatureExtractor;
pub use emotion::{EmotionClassifier, EmotionHistoryEntry};
pub use engagement::{engagement, Observation};
pub use confusion::{is_confusion_candidate, is_confusion_candidate_with, ConfusionSignals};
pub use capture::{CaptureError, CaptureTrigger, SharedSurface, SurfaceCapture};
pub use sampler::{sample_channel, EyesClosedTracker, SamplePublisher, SampleReader, SessionSampler};
pub use runner::{sampling_loop, SamplingController, SessionClock, SharedSampler};
pub use report::{compute_metrics, generate_report, EmotionCounts, SessionMetrics};
pub use analytics::{analyze, SessionAnalytics};
pub use replay::{parse_frames, ReplayError, ReplayFrame, Replayer};
pub use store::{SessionStore, StoreError};
pub use ask::{build_summary, AskClient, AskError};
pub use api::{create_router, router_with_state, run_server, AppState};
