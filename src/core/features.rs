//! Feature Extractor: landmark set → FeatureSample
//!
//! Works on the MediaPipe refined face mesh (478 points, iris at 468-477).
//! Every derived value is emitted as-is; no smoothing across frames.

use crate::config::FeatureConfig;
use crate::MIN_LANDMARKS;
use crate::types::{FeatureSample, GazeZone, Landmark};

// =============================================================================
// LANDMARK INDICES - MediaPipe FaceLandmarker topology
// =============================================================================

const LEFT_EYE_OUTER: usize = 33;
const LEFT_EYE_INNER: usize = 133;
const LEFT_EYE_TOP: usize = 159;
const LEFT_EYE_BOTTOM: usize = 145;
const LEFT_IRIS: [usize; 5] = [468, 469, 470, 471, 472];

const RIGHT_EYE_OUTER: usize = 263;
const RIGHT_EYE_INNER: usize = 362;
const RIGHT_EYE_TOP: usize = 386;
const RIGHT_EYE_BOTTOM: usize = 374;
const RIGHT_IRIS: [usize; 5] = [473, 474, 475, 476, 477];

const MOUTH_LEFT: usize = 61;
const MOUTH_RIGHT: usize = 291;
const MOUTH_TOP: usize = 13;
const MOUTH_BOTTOM: usize = 14;

const LEFT_BROW_TOP: usize = 107;
const LEFT_BROW_INNER: usize = 70;
const RIGHT_BROW_TOP: usize = 336;
const RIGHT_BROW_INNER: usize = 300;

/// Keeps geometry ratios finite when a span collapses
const EPSILON: f64 = 1e-6;

/// One eye's landmarks
struct Eye {
    outer: Landmark,
    inner: Landmark,
    top: Landmark,
    bottom: Landmark,
    iris: Option<Landmark>,
}

impl Eye {
    fn from_mesh(lm: &[Landmark], outer: usize, inner: usize, top: usize, bottom: usize, iris: &[usize]) -> Self {
        let iris_points: Vec<Landmark> = iris.iter().filter_map(|&i| lm.get(i).copied()).collect();
        Self {
            outer: lm[outer],
            inner: lm[inner],
            top: lm[top],
            bottom: lm[bottom],
            iris: Landmark::centroid(&iris_points),
        }
    }

    /// Eyelid gap over eye width
    fn openness(&self) -> f64 {
        self.top.distance(&self.bottom) / (self.outer.distance(&self.inner) + EPSILON)
    }

    /// Iris position across the eye, 0 = image left, 1 = image right
    fn horizontal_ratio(&self) -> Option<f64> {
        let iris = self.iris?;
        span_ratio(iris.x, self.outer.x, self.inner.x)
    }

    /// Iris position between the lids, 0 = up, 1 = down
    fn vertical_ratio(&self) -> Option<f64> {
        let iris = self.iris?;
        span_ratio(iris.y, self.top.y, self.bottom.y)
    }
}

/// Position of `value` inside the span of `a`..`b`; `None` for a degenerate span
fn span_ratio(value: f64, a: f64, b: f64) -> Option<f64> {
    let min = a.min(b);
    let max = a.max(b);
    if max == min {
        return None;
    }
    Some((value - min) / (max - min + EPSILON))
}

fn average(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some((a? + b?) / 2.0)
}

/// Stateful only in the "last face seen" clock used for off-screen detection
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    /// Seconds since session start of the last complete landmark set
    last_face_seen: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureExtractor {
    /// Create extractor; the off-screen clock starts at t = 0
    pub fn new(config: FeatureConfig) -> Self {
        Self::starting_at(config, 0.0)
    }

    /// Create extractor whose off-screen clock starts at `t`
    pub fn starting_at(config: FeatureConfig, t: f64) -> Self {
        Self {
            config,
            last_face_seen: t,
        }
    }

    /// Derive one frame's signals
    ///
    /// `now` is seconds since session start. Missing or incomplete landmark
    /// sets yield the face-absent sample rather than an error. The mesh floor
    /// never drops below the highest index read here.
    pub fn extract(&mut self, landmarks: Option<&[Landmark]>, now: f64) -> FeatureSample {
        let lm = match landmarks {
            Some(lm) if lm.len() >= self.config.min_landmarks.max(MIN_LANDMARKS) => lm,
            _ => {
                let unseen_ms = (now - self.last_face_seen) * 1000.0;
                let off_screen = unseen_ms > self.config.off_screen_after_ms as f64;
                return FeatureSample::absent(now, off_screen);
            }
        };

        self.last_face_seen = now;

        let left = Eye::from_mesh(lm, LEFT_EYE_OUTER, LEFT_EYE_INNER, LEFT_EYE_TOP, LEFT_EYE_BOTTOM, &LEFT_IRIS);
        let right = Eye::from_mesh(lm, RIGHT_EYE_OUTER, RIGHT_EYE_INNER, RIGHT_EYE_TOP, RIGHT_EYE_BOTTOM, &RIGHT_IRIS);

        // Both eyes must be shut; one occluded eye is not a blink
        let eyes_closed = left.openness() < self.config.eye_closed_ratio
            && right.openness() < self.config.eye_closed_ratio;

        let h_ratio = average(left.horizontal_ratio(), right.horizontal_ratio());
        let v_ratio = average(left.vertical_ratio(), right.vertical_ratio());
        let gaze = GazeZone::from_ratios(
            h_ratio,
            v_ratio,
            self.config.gaze_low_split,
            self.config.gaze_high_split,
        );

        let mouth_width = lm[MOUTH_LEFT].distance(&lm[MOUTH_RIGHT]);
        let mouth_open = lm[MOUTH_TOP].distance(&lm[MOUTH_BOTTOM]);
        let smile_ratio = mouth_width / (mouth_open + EPSILON);

        let left_gap = (lm[LEFT_BROW_TOP].y - lm[LEFT_BROW_INNER].y).abs();
        let right_gap = (lm[RIGHT_BROW_TOP].y - lm[RIGHT_BROW_INNER].y).abs();
        let eyebrow_raised =
            left_gap > self.config.eyebrow_raise_gap || right_gap > self.config.eyebrow_raise_gap;

        FeatureSample {
            timestamp: now,
            face_present: true,
            off_screen: false,
            eyes_closed,
            gaze,
            smile_ratio,
            eyebrow_raised,
        }
    }

    /// Seconds-since-start of the last complete detection
    pub fn last_face_seen(&self) -> f64 {
        self.last_face_seen
    }
}

// =============================================================================
// TESTS
// =============================================================================
