//! Landmarks and per-frame feature samples

use serde::{Deserialize, Serialize};
use crate::types::GazeZone;

/// One normalized face landmark (0..1 in image space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in normalized space
    pub fn distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Mean position of a set of landmarks
    pub fn centroid(points: &[Landmark]) -> Option<Landmark> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let x = points.iter().map(|p| p.x).sum::<f64>() / n;
        let y = points.iter().map(|p| p.y).sum::<f64>() / n;
        Some(Landmark { x, y })
    }
}

/// One frame's derived facial signals
///
/// Produced by the feature extractor and consumed by the next sampler tick;
/// never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSample {
    /// Seconds since session start
    #[serde(rename = "t")]
    pub timestamp: f64,
    pub face_present: bool,
    pub off_screen: bool,
    pub eyes_closed: bool,
    pub gaze: GazeZone,
    #[serde(rename = "smile")]
    pub smile_ratio: f64,
    pub eyebrow_raised: bool,
}

impl FeatureSample {
    /// Face-absent defaults, used for missing landmarks and empty sampler slots
    pub fn absent(timestamp: f64, off_screen: bool) -> Self {
        Self {
            timestamp,
            face_present: false,
            off_screen,
            eyes_closed: false,
            gaze: GazeZone::Unknown,
            smile_ratio: 0.0,
            eyebrow_raised: false,
        }
    }
}
