//! Inshight: facial-signal engagement pipeline
//!
//! landmarks → FeatureExtractor → {EmotionClassifier, engagement} →
//! SessionSampler (1 Hz buffer) → generate_report (post-hoc)

pub mod config;
pub mod core;
pub mod logging;
pub mod types;

// =============================================================================
// FEATURE THRESHOLDS [C] - hand tuned, overridable through PipelineConfig
// =============================================================================

/// Minimum landmark count for iris/eye/mouth geometry (MediaPipe refined mesh)
pub const MIN_LANDMARKS: usize = 478;

/// Face considered off-screen after this long without a detection (milliseconds)
pub const OFF_SCREEN_AFTER_MS: u64 = 600;

/// Eye openness ratio below which an eye counts as closed
pub const EYE_CLOSED_RATIO: f64 = 0.18;

/// Gaze split points on both axes (normalized iris position)
pub const GAZE_LOW_SPLIT: f64 = 0.35;
pub const GAZE_HIGH_SPLIT: f64 = 0.65;

/// Eyebrow-top to eyebrow-inner vertical gap that reads as raised
pub const EYEBROW_RAISE_GAP: f64 = 0.015;

// =============================================================================
// EMOTION [C]
// =============================================================================

/// Smile ratio above which the face reads as positive
pub const SMILE_POSITIVE_RATIO: f64 = 2.2;

/// Smile ratio below which the face reads as a frown
pub const SMILE_FROWN_RATIO: f64 = 1.8;

/// Trailing emotion history window (seconds)
pub const EMOTION_WINDOW_SECS: f64 = 10.0;

/// Frown ticks inside the window before concentration escalates to frustration
pub const FRUSTRATION_TICKS: usize = 5;

// =============================================================================
// ENGAGEMENT + CONFUSION [C]
// =============================================================================

pub const ENGAGEMENT_BASELINE: f64 = 0.55;
pub const ENGAGEMENT_ABSENT: f64 = 0.10;
pub const ENGAGEMENT_EYES_CLOSED: f64 = 0.20;
pub const ENGAGEMENT_TASK_BONUS: f64 = 0.10;

/// Engagement below this is a confusion candidate
pub const CONFUSION_ENGAGEMENT: f64 = 0.35;

/// Continuous eyes-closed time that counts as a confusion candidate (seconds)
pub const CONFUSION_EYES_CLOSED_SECS: f64 = 1.0;

// =============================================================================
// SESSION [C]
// =============================================================================

/// Sampling period (milliseconds) - 1 Hz
pub const SAMPLE_PERIOD_MS: u64 = 1000;

/// Minimum gap between two snapshots (seconds)
pub const SNAPSHOT_COOLDOWN_SECS: f64 = 3.0;

/// Hard cap on snapshots per session
pub const MAX_SNAPSHOTS: usize = 25;

/// Latest feature sample older than this is treated as "no face" (seconds)
pub const SAMPLE_STALE_SECS: f64 = 2.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "0.4.0";

/// Round to `places` decimals, the way every stored metric is written
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
