//! Engagement Scorer
//!
//! Pure function of one observation and the task-active flag:
//! - face missing or off screen → 0.10
//! - eyes closed → 0.20
//! - otherwise baseline 0.55 + gaze adjustment + task bonus, clamped to [0, 1]

use crate::config::EngagementConfig;
use crate::round_to;
use crate::types::{FeatureSample, GazeZone, MetricPoint};

/// Fields the scorer reads
///
/// Implemented for both the ephemeral sample and the stored point so the
/// live sampler and the post-hoc report score the same way.
pub trait Observation {
    fn face_present(&self) -> bool;
    fn off_screen(&self) -> bool;
    fn eyes_closed(&self) -> bool;
    fn gaze(&self) -> GazeZone;
}

impl Observation for FeatureSample {
    fn face_present(&self) -> bool {
        self.face_present
    }
    fn off_screen(&self) -> bool {
        self.off_screen
    }
    fn eyes_closed(&self) -> bool {
        self.eyes_closed
    }
    fn gaze(&self) -> GazeZone {
        self.gaze
    }
}

impl Observation for MetricPoint {
    fn face_present(&self) -> bool {
        self.face_present
    }
    fn off_screen(&self) -> bool {
        self.off_screen
    }
    fn eyes_closed(&self) -> bool {
        self.eyes_closed
    }
    fn gaze(&self) -> GazeZone {
        self.gaze
    }
}

/// Additive adjustment for where the user is looking
pub fn gaze_adjustment(zone: GazeZone) -> f64 {
    match zone {
        GazeZone::Center | GazeZone::UpperCenter => 0.20,
        GazeZone::UpperLeft | GazeZone::UpperRight => 0.15,
        GazeZone::Left | GazeZone::Right => 0.05,
        GazeZone::LowerLeft | GazeZone::LowerCenter | GazeZone::LowerRight => -0.05,
        GazeZone::Unknown => -0.05,
    }
}

/// Engagement in [0, 1], rounded to 2 decimals
pub fn engagement<O: Observation + ?Sized>(obs: &O, task_active: bool, config: &EngagementConfig) -> f64 {
    if !obs.face_present() || obs.off_screen() {
        return config.absent;
    }
    if obs.eyes_closed() {
        return config.eyes_closed;
    }

    let bonus = if task_active { config.task_bonus } else { 0.0 };
    let raw = config.baseline + gaze_adjustment(obs.gaze()) + bonus;
    round_to(raw.clamp(0.0, 1.0), 2)
}

// =============================================================================
// TESTS
// =============================================================================
