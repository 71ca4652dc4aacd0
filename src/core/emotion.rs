//! Emotion Classifier: windowed smile/eyebrow history → one emotion label
//!
//! Instantaneous rules:
//! - eyebrow raised → CONFUSION
//! - smile > 2.2 → POSITIVE
//! - smile < 1.8 → CONCENTRATION (tentative)
//! - otherwise → NEUTRAL
//!
//! A frown that persists for 5 ticks inside the trailing 10 s escalates the
//! current tick to FRUSTRATION.

use std::collections::VecDeque;
use log::debug;
use crate::config::EmotionConfig;
use crate::types::{Emotion, FeatureSample};

/// One remembered tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionHistoryEntry {
    pub timestamp: f64,
    /// Instantaneous label, before escalation
    pub emotion: Emotion,
    pub smile_ratio: f64,
}

/// Stateful classifier, owned by exactly one session
#[derive(Debug, Clone)]
pub struct EmotionClassifier {
    config: EmotionConfig,
    history: VecDeque<EmotionHistoryEntry>,
}

impl Default for EmotionClassifier {
    fn default() -> Self {
        Self::new(EmotionConfig::default())
    }
}

impl EmotionClassifier {
    pub fn new(config: EmotionConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
        }
    }

    /// Label from the current sample alone
    ///
    /// An absent face carries no expression and reads as neutral.
    pub fn instantaneous(&self, sample: &FeatureSample) -> Emotion {
        if !sample.face_present {
            Emotion::Neutral
        } else if sample.eyebrow_raised {
            Emotion::Confusion
        } else if sample.smile_ratio > self.config.smile_positive_ratio {
            Emotion::Positive
        } else if sample.smile_ratio < self.config.smile_frown_ratio {
            Emotion::Concentration
        } else {
            Emotion::Neutral
        }
    }

    /// Classify one tick at time `t` (seconds) and remember it
    pub fn classify(&mut self, sample: &FeatureSample, t: f64) -> Emotion {
        let label = self.instantaneous(sample);

        self.history.push_back(EmotionHistoryEntry {
            timestamp: t,
            emotion: label,
            smile_ratio: sample.smile_ratio,
        });
        self.prune(t);

        if label != Emotion::Concentration {
            return label;
        }

        let frown_ticks = self.frown_ticks();
        if frown_ticks >= self.config.frustration_ticks {
            debug!("frown held for {} ticks at t={:.1}, escalating to frustration", frown_ticks, t);
            Emotion::Frustration
        } else {
            Emotion::Concentration
        }
    }

    /// Entries inside the window that look like a held frown
    fn frown_ticks(&self) -> usize {
        self.history
            .iter()
            .filter(|e| {
                e.emotion == Emotion::Concentration
                    || (e.smile_ratio < self.config.smile_frown_ratio && e.emotion != Emotion::Positive)
            })
            .count()
    }

    /// Drop entries at least `window_secs` older than `now`
    fn prune(&mut self, now: f64) {
        let window = self.config.window_secs;
        self.history.retain(|e| now - e.timestamp < window);
    }

    /// Remembered ticks (oldest first)
    pub fn history(&self) -> impl Iterator<Item = &EmotionHistoryEntry> {
        self.history.iter()
    }

    /// Number of remembered ticks
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget everything (session boundary)
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GazeZone;

    fn face(smile: f64, brow: bool) -> FeatureSample {
        FeatureSample {
            timestamp: 0.0,
            face_present: true,
            off_screen: false,
            eyes_closed: false,
            gaze: GazeZone::Center,
            smile_ratio: smile,
            eyebrow_raised: brow,
        }
    }

    #[test]
    fn test_instantaneous_rules() {
        let c = EmotionClassifier::default();
        assert_eq!(c.instantaneous(&face(2.5, true)), Emotion::Confusion);
        assert_eq!(c.instantaneous(&face(2.5, false)), Emotion::Positive);
        assert_eq!(c.instantaneous(&face(1.0, false)), Emotion::Concentration);
        assert_eq!(c.instantaneous(&face(2.0, false)), Emotion::Neutral);
        assert_eq!(c.instantaneous(&FeatureSample::absent(0.0, false)), Emotion::Neutral);
    }

    #[test]
    fn test_five_frown_ticks_escalate() {
        let mut c = EmotionClassifier::default();
        for t in 0..4 {
            assert_eq!(c.classify(&face(1.0, false), t as f64), Emotion::Concentration);
        }
        assert_eq!(c.classify(&face(1.0, false), 4.0), Emotion::Frustration);
    }

    #[test]
    fn test_four_frown_ticks_stay_concentration() {
        let mut c = EmotionClassifier::default();
        let mut last = Emotion::Neutral;
        for t in 0..4 {
            last = c.classify(&face(1.0, false), t as f64);
        }
        assert_eq!(last, Emotion::Concentration);
    }

    #[test]
    fn test_sparse_frowns_expire() {
        let mut c = EmotionClassifier::default();
        let mut last = Emotion::Neutral;
        for t in [0.0, 3.0, 6.0, 9.0, 12.0, 15.0] {
            last = c.classify(&face(1.0, false), t);
        }
        // Only 12, 9, 6 and 15 are inside the window at t=15
        assert_eq!(c.history_len(), 4);
        assert_eq!(last, Emotion::Concentration);
    }

    #[test]
    fn test_window_edge_is_exclusive() {
        let mut c = EmotionClassifier::default();
        c.classify(&face(2.0, false), 0.0);
        c.classify(&face(2.0, false), 10.0);
        assert_eq!(c.history_len(), 1);
    }

    #[test]
    fn test_absent_face_counts_as_low_smile() {
        let mut c = EmotionClassifier::default();
        for t in 0..4 {
            assert_eq!(c.classify(&FeatureSample::absent(t as f64, false), t as f64), Emotion::Neutral);
        }
        assert_eq!(c.classify(&face(1.0, false), 4.0), Emotion::Frustration);
    }

    #[test]
    fn test_smiles_break_the_pattern() {
        let mut c = EmotionClassifier::default();
        c.classify(&face(1.0, false), 0.0);
        c.classify(&face(1.0, false), 1.0);
        c.classify(&face(2.6, false), 2.0);
        c.classify(&face(2.6, false), 3.0);
        assert_eq!(c.classify(&face(1.0, false), 4.0), Emotion::Concentration);
    }

    #[test]
    fn test_only_positive_escapes_never_escalate_non_frown() {
        let mut c = EmotionClassifier::default();
        for t in 0..8 {
            assert_eq!(c.classify(&face(1.0, true), t as f64), Emotion::Confusion);
        }
        // Low-smile confusion ticks still count toward the frown pattern
        assert_eq!(c.classify(&face(1.0, false), 8.0), Emotion::Frustration);
    }

    #[test]
    fn test_configurable_window() {
        let config = EmotionConfig { frustration_ticks: 3, ..Default::default() };
        let mut c = EmotionClassifier::new(config);
        c.classify(&face(1.0, false), 0.0);
        c.classify(&face(1.0, false), 1.0);
        assert_eq!(c.classify(&face(1.0, false), 2.0), Emotion::Frustration);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut c = EmotionClassifier::default();
        for t in 0..4 {
            c.classify(&face(1.0, false), t as f64);
        }
        c.reset();
        assert_eq!(c.history_len(), 0);
        assert_eq!(c.classify(&face(1.0, false), 4.0), Emotion::Concentration);
    }
}
