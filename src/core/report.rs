//! Report Generator
//!
//! Batch and stateless over a closed session. Zero points → no report.
//!
//! stress_index = clamp((avgHR − 70)/25 + (avgBR − 14)/10, 0, 1)
//! satisfaction = round(1 + 4·avgEng)
//! ease         = round(5 − 4·stress)
//! clarity      = round(2 + 3·(1 − (1 − avgEng)·0.9))
//! confidence   = clamp(1 − 2·variance + 0.3·toneClarity, 0, 1)

use crate::config::{EngagementConfig, PipelineConfig};
use crate::core::engagement::engagement;
use crate::round_to;
use crate::types::{
    task_window, Emotion, EngagementMoment, Moments, Report, Scores, SessionPayload, StressMoment,
    Tone,
};

const DEFAULT_HEART_RATE: f64 = 75.0;
const DEFAULT_BREATH_RATE: f64 = 15.0;
const DEFAULT_MAX_HEART_RATE: u32 = 80;

const STRESS_INSIGHT_ABOVE: f64 = 0.55;
const LOW_ENGAGEMENT_INSIGHT_BELOW: f64 = 0.45;
const QUESTION_STRESS_ABOVE: f64 = 0.65;
const QUESTION_ENGAGEMENT_BELOW: f64 = 0.4;
const MAX_INSIGHTS: usize = 3;
const STRESS_MOMENTS: usize = 2;
const LOW_ENGAGEMENT_MOMENTS: usize = 1;

pub const MICRO_QUESTION: &str = "Was any part of the task confusing?";

/// Points per emotion category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmotionCounts {
    pub positive: usize,
    /// negative ∪ frustration
    pub negative: usize,
    pub concentration: usize,
    pub confusion: usize,
    pub frustration: usize,
}

impl EmotionCounts {
    pub fn tally<'a>(emotions: impl IntoIterator<Item = &'a Emotion>) -> Self {
        let mut counts = Self::default();
        for emotion in emotions {
            match emotion {
                Emotion::Positive => counts.positive += 1,
                Emotion::Negative => counts.negative += 1,
                Emotion::Frustration => {
                    counts.negative += 1;
                    counts.frustration += 1;
                }
                Emotion::Concentration => counts.concentration += 1,
                Emotion::Confusion => counts.confusion += 1,
                Emotion::Neutral => {}
            }
        }
        counts
    }

    /// Confusion-dominant sessions land on Mixed
    pub fn tone(&self) -> Tone {
        let pos = self.positive as f64;
        let neg = self.negative as f64;
        if pos > 1.2 * neg && self.positive > self.concentration && self.positive > self.confusion {
            Tone::Positive
        } else if neg > 1.2 * pos || self.frustration > self.positive {
            Tone::Negative
        } else {
            Tone::Mixed
        }
    }

    /// |pos − neg| over all classified (non-neutral) points
    pub fn tone_clarity(&self) -> f64 {
        let total = self.positive + self.negative + self.concentration + self.confusion;
        if total == 0 {
            return 0.0;
        }
        (self.positive as f64 - self.negative as f64).abs() / total as f64
    }
}

/// Aggregates feeding the scores
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetrics {
    pub engagements: Vec<f64>,
    pub avg_engagement: f64,
    pub min_engagement: f64,
    pub engagement_variance: f64,
    pub avg_heart_rate: f64,
    pub avg_breath_rate: f64,
    pub max_heart_rate: u32,
    pub has_heart_rate: bool,
    pub stress_index: f64,
    pub emotions: EmotionCounts,
}

/// Engagement per point, task-active inside the first task window
pub fn point_engagements(payload: &SessionPayload, config: &EngagementConfig) -> Vec<f64> {
    let window = task_window(&payload.events);
    payload
        .points
        .iter()
        .map(|p| {
            let task_active = window.is_some_and(|(start, end)| start <= p.timestamp && p.timestamp <= end);
            engagement(p, task_active, config)
        })
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn compute_metrics(payload: &SessionPayload, config: &EngagementConfig) -> Option<SessionMetrics> {
    if payload.points.is_empty() {
        return None;
    }

    let engagements = point_engagements(payload, config);
    let avg_engagement = mean(&engagements)?;
    let min_engagement = engagements.iter().copied().fold(f64::INFINITY, f64::min);
    let engagement_variance = if avg_engagement == 0.0 {
        1.0
    } else {
        engagements.iter().map(|e| (e - avg_engagement).powi(2)).sum::<f64>() / engagements.len() as f64
    };

    let heart_rates: Vec<f64> = payload.points.iter().filter_map(|p| p.heart_rate).map(f64::from).collect();
    let breath_rates: Vec<f64> = payload.points.iter().filter_map(|p| p.breath_rate).map(f64::from).collect();
    let avg_heart_rate = mean(&heart_rates).unwrap_or(DEFAULT_HEART_RATE);
    let avg_breath_rate = mean(&breath_rates).unwrap_or(DEFAULT_BREATH_RATE);
    let max_heart_rate = payload
        .points
        .iter()
        .filter_map(|p| p.heart_rate)
        .max()
        .unwrap_or(DEFAULT_MAX_HEART_RATE);

    let stress_index = ((avg_heart_rate - 70.0) / 25.0 + (avg_breath_rate - 14.0) / 10.0).clamp(0.0, 1.0);

    Some(SessionMetrics {
        engagements,
        avg_engagement,
        min_engagement,
        engagement_variance,
        avg_heart_rate,
        avg_breath_rate,
        max_heart_rate,
        has_heart_rate: !heart_rates.is_empty(),
        stress_index,
        emotions: EmotionCounts::tally(payload.points.iter().map(|p| &p.emotion)),
    })
}

fn score(value: f64) -> u8 {
    value.round().clamp(1.0, 5.0) as u8
}

pub fn scores(metrics: &SessionMetrics) -> Scores {
    let eng = metrics.avg_engagement;
    Scores {
        satisfaction: score(1.0 + 4.0 * eng),
        ease: score(5.0 - 4.0 * metrics.stress_index),
        clarity: score(2.0 + 3.0 * (1.0 - (1.0 - eng) * 0.9)),
    }
}

/// Top stress points and the lowest-engagement point, stable on ties
///
/// Points without vitals score at the default heart and breath rates.
pub fn key_moments(payload: &SessionPayload, engagements: &[f64]) -> Moments {
    let mut stressed: Vec<StressMoment> = payload
        .points
        .iter()
        .map(|p| StressMoment {
            t: p.timestamp,
            hr: p.heart_rate.unwrap_or(DEFAULT_HEART_RATE as u32),
            br: p.breath_rate.unwrap_or(DEFAULT_BREATH_RATE as u32),
        })
        .collect();
    let stress_score = |m: &StressMoment| (m.hr as f64 - 70.0) * 0.6 + (m.br as f64 - 14.0) * 1.2;
    stressed.sort_by(|a, b| stress_score(b).total_cmp(&stress_score(a)));
    stressed.truncate(STRESS_MOMENTS);

    let mut low: Vec<EngagementMoment> = payload
        .points
        .iter()
        .zip(engagements)
        .map(|(p, &eng)| EngagementMoment { t: p.timestamp, eng })
        .collect();
    low.sort_by(|a, b| a.eng.total_cmp(&b.eng));
    low.truncate(LOW_ENGAGEMENT_MOMENTS);

    Moments {
        stress: stressed,
        engagement_low: low,
    }
}

pub fn insights(metrics: &SessionMetrics) -> Vec<String> {
    let mut out = vec![format!(
        "Average engagement was {:.0}%.",
        round_to(metrics.avg_engagement * 100.0, 0)
    )];
    if metrics.stress_index > STRESS_INSIGHT_ABOVE {
        out.push("Signs of stress were elevated (HR/BR higher than baseline).".to_string());
    }
    if metrics.min_engagement < LOW_ENGAGEMENT_INSIGHT_BELOW {
        out.push("Engagement dropped at least once (possible confusion/boredom moment).".to_string());
    }
    if metrics.has_heart_rate {
        out.push(format!("Peak heart rate reached {} bpm during the session.", metrics.max_heart_rate));
    }
    out.truncate(MAX_INSIGHTS);
    out
}

pub fn micro_question(metrics: &SessionMetrics) -> Option<String> {
    if metrics.stress_index > QUESTION_STRESS_ABOVE || metrics.min_engagement < QUESTION_ENGAGEMENT_BELOW {
        Some(MICRO_QUESTION.to_string())
    } else {
        None
    }
}

pub fn confidence(metrics: &SessionMetrics) -> f64 {
    let raw = 1.0 - 2.0 * metrics.engagement_variance + 0.3 * metrics.emotions.tone_clarity();
    round_to(raw.clamp(0.0, 1.0), 2)
}

/// Summarize a session; `None` when it has no points
pub fn generate_report(payload: &SessionPayload, config: &PipelineConfig) -> Option<Report> {
    let metrics = compute_metrics(payload, &config.engagement)?;

    Some(Report {
        scores: scores(&metrics),
        tone: metrics.emotions.tone(),
        insights: insights(&metrics),
        moments: key_moments(payload, &metrics.engagements),
        micro_question: micro_question(&metrics),
        confidence: confidence(&metrics),
    })
}

// =============================================================================
// TESTS
// =============================================================================
