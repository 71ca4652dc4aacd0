//! Chart series derived from a stored session

use serde::Serialize;
use std::collections::HashMap;

use crate::config::EngagementConfig;
use crate::core::report::point_engagements;
use crate::round_to;
use crate::types::{GazeZone, SessionPayload};

const SMILE_SCALE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub t: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeEngagement {
    pub zone: GazeZone,
    pub avg_engagement: f64,
    pub samples: usize,
}

/// All series for one session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAnalytics {
    pub engagement: Vec<SeriesPoint>,
    pub engagement_by_gaze: Vec<GazeEngagement>,
    pub valence: Vec<SeriesPoint>,
    pub smile: Vec<SeriesPoint>,
}

pub fn engagement_timeline(payload: &SessionPayload, config: &EngagementConfig) -> Vec<SeriesPoint> {
    payload
        .points
        .iter()
        .zip(point_engagements(payload, config))
        .map(|(p, value)| SeriesPoint { t: p.timestamp, value })
        .collect()
}

/// Average engagement per gaze zone, highest first
pub fn engagement_by_gaze(payload: &SessionPayload, config: &EngagementConfig) -> Vec<GazeEngagement> {
    let mut totals: HashMap<GazeZone, (f64, usize)> = HashMap::new();
    for (p, eng) in payload.points.iter().zip(point_engagements(payload, config)) {
        let entry = totals.entry(p.gaze).or_insert((0.0, 0));
        entry.0 += eng;
        entry.1 += 1;
    }

    // Walk zones in a fixed order so ties sort deterministically
    let mut out: Vec<GazeEngagement> = GazeZone::ALL
        .iter()
        .filter_map(|zone| {
            totals.get(zone).map(|&(sum, n)| GazeEngagement {
                zone: *zone,
                avg_engagement: round_to(sum / n as f64, 2),
                samples: n,
            })
        })
        .collect();
    out.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    out
}

pub fn valence_timeline(payload: &SessionPayload) -> Vec<SeriesPoint> {
    payload
        .points
        .iter()
        .map(|p| SeriesPoint { t: p.timestamp, value: p.emotion.valence() })
        .collect()
}

/// Smile ratio scaled into roughly [0, 1]
pub fn smile_timeline(payload: &SessionPayload) -> Vec<SeriesPoint> {
    payload
        .points
        .iter()
        .map(|p| SeriesPoint { t: p.timestamp, value: p.smile_ratio / SMILE_SCALE })
        .collect()
}

pub fn analyze(payload: &SessionPayload, config: &EngagementConfig) -> SessionAnalytics {
    SessionAnalytics {
        engagement: engagement_timeline(payload, config),
        engagement_by_gaze: engagement_by_gaze(payload, config),
        valence: valence_timeline(payload),
        smile: smile_timeline(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Emotion, FeatureSample, MetricPoint, SessionMode};

    fn point(t: f64, gaze: GazeZone, emotion: Emotion, smile: f64) -> MetricPoint {
        let sample = FeatureSample {
            timestamp: t,
            face_present: true,
            off_screen: false,
            eyes_closed: false,
            gaze,
            smile_ratio: smile,
            eyebrow_raised: false,
        };
        MetricPoint::from_sample(t, &sample, emotion)
    }

    fn payload() -> SessionPayload {
        let mut p = SessionPayload::new(SessionMode::Activity);
        p.points = vec![
            point(0.0, GazeZone::LowerLeft, Emotion::Concentration, 1.5),
            point(1.0, GazeZone::Center, Emotion::Positive, 3.0),
            point(2.0, GazeZone::Center, Emotion::Neutral, 2.0),
            point(3.0, GazeZone::Right, Emotion::Confusion, 2.0),
        ];
        p
    }

    #[test]
    fn test_engagement_timeline() {
        let series = engagement_timeline(&payload(), &EngagementConfig::default());
        let values: Vec<f64> = series.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.5, 0.75, 0.75, 0.6]);
    }

    #[test]
    fn test_gaze_ranking_descending() {
        let ranked = engagement_by_gaze(&payload(), &EngagementConfig::default());
        let zones: Vec<GazeZone> = ranked.iter().map(|g| g.zone).collect();
        assert_eq!(zones, vec![GazeZone::Center, GazeZone::Right, GazeZone::LowerLeft]);
        assert_eq!(ranked[0].samples, 2);
    }

    #[test]
    fn test_valence_and_smile() {
        let p = payload();
        let valence: Vec<f64> = valence_timeline(&p).iter().map(|s| s.value).collect();
        assert_eq!(valence, vec![0.3, 1.0, 0.5, -0.2]);

        let smile = smile_timeline(&p);
        assert_eq!(smile[1].value, 1.0);
        assert_eq!(smile[0].value, 0.5);
    }

    #[test]
    fn test_empty_session() {
        let a = analyze(&SessionPayload::new(SessionMode::Task), &EngagementConfig::default());
        assert!(a.engagement.is_empty());
        assert!(a.engagement_by_gaze.is_empty());
    }
}
