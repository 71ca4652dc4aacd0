//! Persisted 1 Hz metric points

use serde::{Deserialize, Serialize};
use crate::types::{Emotion, FeatureSample, GazeZone};

/// One sampler tick, immutable once appended to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    /// Seconds since session start
    #[serde(rename = "t")]
    pub timestamp: f64,
    /// Task video playback position, when a task video is running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_time: Option<f64>,
    /// Synthetic placeholder, not a measurement
    #[serde(rename = "hr", default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    /// Synthetic placeholder, not a measurement
    #[serde(rename = "br", default, skip_serializing_if = "Option::is_none")]
    pub breath_rate: Option<u32>,
    pub face_present: bool,
    pub off_screen: bool,
    pub eyes_closed: bool,
    pub gaze: GazeZone,
    #[serde(rename = "smile")]
    pub smile_ratio: f64,
    pub emotion: Emotion,
    #[serde(default)]
    pub eyebrow_raised: bool,
}

impl MetricPoint {
    /// Build a point from a feature sample and the tick's classification
    pub fn from_sample(timestamp: f64, sample: &FeatureSample, emotion: Emotion) -> Self {
        Self {
            timestamp,
            video_time: None,
            heart_rate: None,
            breath_rate: None,
            face_present: sample.face_present,
            off_screen: sample.off_screen,
            eyes_closed: sample.eyes_closed,
            gaze: sample.gaze,
            smile_ratio: sample.smile_ratio,
            emotion,
            eyebrow_raised: sample.eyebrow_raised,
        }
    }

    /// Attach synthetic vitals
    pub fn with_vitals(mut self, heart_rate: u32, breath_rate: u32) -> Self {
        self.heart_rate = Some(heart_rate);
        self.breath_rate = Some(breath_rate);
        self
    }

    /// Attach a video playback position
    pub fn with_video_time(mut self, video_time: Option<f64>) -> Self {
        self.video_time = video_time;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_field_names() {
        let sample = FeatureSample::absent(1.0, false);
        let point = MetricPoint::from_sample(1.0, &sample, Emotion::Neutral).with_vitals(80, 16);
        let json = serde_json::to_value(&point).unwrap();

        assert_eq!(json["t"], 1.0);
        assert_eq!(json["hr"], 80);
        assert_eq!(json["br"], 16);
        assert_eq!(json["facePresent"], false);
        assert_eq!(json["gaze"], "unknown");
        assert!(json.get("videoTime").is_none());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"t":2.0,"facePresent":true,"offScreen":false,"eyesClosed":false,
            "gaze":"center","smile":2.4,"emotion":"positive"}"#;
        let point: MetricPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.heart_rate, None);
        assert!(!point.eyebrow_raised);
        assert_eq!(point.emotion, Emotion::Positive);
    }
}
