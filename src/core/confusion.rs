//! Confusion Detector
//!
//! A tick is a confusion candidate if any of:
//! - engagement < 0.35
//! - emotion is negative or frustration
//! - off screen
//! - eyes closed for more than 1 s
//!
//! No side effects and no rate limiting; the capture trigger owns cooldowns.

use crate::config::{ConfusionConfig, EngagementConfig};
use crate::core::engagement::engagement;
use crate::types::{Emotion, MetricPoint};

/// Precomputed inputs to the predicate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfusionSignals {
    pub engagement: f64,
    pub emotion: Emotion,
    pub off_screen: bool,
    pub eyes_closed: bool,
    /// Seconds the eyes have been continuously closed
    pub eyes_closed_duration: f64,
}

pub fn is_confusion_candidate_with(signals: &ConfusionSignals, config: &ConfusionConfig) -> bool {
    signals.engagement < config.engagement_threshold
        || signals.emotion.is_negative()
        || signals.off_screen
        || (signals.eyes_closed && signals.eyes_closed_duration > config.eyes_closed_secs)
}

/// Score `point` and test it
pub fn is_confusion_candidate(
    point: &MetricPoint,
    task_active: bool,
    eyes_closed_duration: f64,
    engagement_config: &EngagementConfig,
    config: &ConfusionConfig,
) -> bool {
    let signals = ConfusionSignals {
        engagement: engagement(point, task_active, engagement_config),
        emotion: point.emotion,
        off_screen: point.off_screen,
        eyes_closed: point.eyes_closed,
        eyes_closed_duration,
    };
    is_confusion_candidate_with(&signals, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeatureSample, GazeZone};

    fn calm() -> ConfusionSignals {
        ConfusionSignals {
            engagement: 0.5,
            emotion: Emotion::Neutral,
            off_screen: false,
            eyes_closed: false,
            eyes_closed_duration: 0.0,
        }
    }

    #[test]
    fn test_calm_is_not_candidate() {
        assert!(!is_confusion_candidate_with(&calm(), &ConfusionConfig::default()));
    }

    #[test]
    fn test_eyes_closed_duration_boundary() {
        let cfg = ConfusionConfig::default();
        let long = ConfusionSignals { eyes_closed: true, eyes_closed_duration: 1.01, ..calm() };
        let short = ConfusionSignals { eyes_closed_duration: 0.99, ..long };
        assert!(is_confusion_candidate_with(&long, &cfg));
        assert!(!is_confusion_candidate_with(&short, &cfg));
    }

    #[test]
    fn test_each_trigger() {
        let cfg = ConfusionConfig::default();
        assert!(is_confusion_candidate_with(&ConfusionSignals { engagement: 0.34, ..calm() }, &cfg));
        assert!(!is_confusion_candidate_with(&ConfusionSignals { engagement: 0.35, ..calm() }, &cfg));
        assert!(is_confusion_candidate_with(&ConfusionSignals { emotion: Emotion::Frustration, ..calm() }, &cfg));
        assert!(is_confusion_candidate_with(&ConfusionSignals { emotion: Emotion::Negative, ..calm() }, &cfg));
        assert!(!is_confusion_candidate_with(&ConfusionSignals { emotion: Emotion::Confusion, ..calm() }, &cfg));
        assert!(is_confusion_candidate_with(&ConfusionSignals { off_screen: true, ..calm() }, &cfg));
    }

    #[test]
    fn test_point_wrapper() {
        let ecfg = EngagementConfig::default();
        let cfg = ConfusionConfig::default();

        let absent = MetricPoint::from_sample(1.0, &FeatureSample::absent(1.0, false), Emotion::Neutral);
        assert!(is_confusion_candidate(&absent, true, 0.0, &ecfg, &cfg));

        let looking = FeatureSample {
            timestamp: 1.0,
            face_present: true,
            off_screen: false,
            eyes_closed: false,
            gaze: GazeZone::Center,
            smile_ratio: 2.0,
            eyebrow_raised: false,
        };
        let point = MetricPoint::from_sample(1.0, &looking, Emotion::Neutral);
        assert!(!is_confusion_candidate(&point, false, 0.0, &ecfg, &cfg));
    }
}
