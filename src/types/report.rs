//! Session report structures and terminal display

use serde::{Deserialize, Serialize};

/// Survey-style scores, each 1..5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub satisfaction: u8,
    pub ease: u8,
    pub clarity: u8,
}

/// Session-level sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Mixed,
    Negative,
}

impl Tone {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Tone::Positive => "\x1b[32m", // Green
            Tone::Mixed => "\x1b[33m",    // Yellow
            Tone::Negative => "\x1b[31m", // Red
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tone::Positive => "Positive",
            Tone::Mixed => "Mixed",
            Tone::Negative => "Negative",
        };
        write!(f, "{}", name)
    }
}

/// A high-stress tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressMoment {
    pub t: f64,
    pub hr: u32,
    pub br: u32,
}

/// A low-engagement tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementMoment {
    pub t: f64,
    pub eng: f64,
}

/// Key moments extracted from the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moments {
    /// Up to two, highest stress first
    pub stress: Vec<StressMoment>,
    /// Up to one, lowest engagement
    pub engagement_low: Vec<EngagementMoment>,
}

/// Derived summary of one session; recomputed on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub scores: Scores,
    pub tone: Tone,
    /// Up to three short insights
    pub insights: Vec<String>,
    pub moments: Moments,
    pub micro_question: Option<String>,
    /// 0..1, two decimals
    pub confidence: f64,
}

impl Report {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.tone.color_code();
        let reset = "\x1b[0m";
        let mut out = format!(
            "{}tone={} | satisfaction={} ease={} clarity={} | confidence={:.0}%{}\n",
            color,
            self.tone,
            self.scores.satisfaction,
            self.scores.ease,
            self.scores.clarity,
            self.confidence * 100.0,
            reset
        );
        for insight in &self.insights {
            out.push_str(&format!("  • {}\n", insight));
        }
        for m in &self.moments.stress {
            out.push_str(&format!("\x1b[90m  stress @ {:.1}s  hr={} br={}{}\n", m.t, m.hr, m.br, reset));
        }
        for m in &self.moments.engagement_low {
            out.push_str(&format!("\x1b[90m  low engagement @ {:.1}s  eng={:.2}{}\n", m.t, m.eng, reset));
        }
        if let Some(q) = &self.micro_question {
            out.push_str(&format!("\x1b[36m  ? {}{}\n", q, reset));
        }
        out
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "tone={} | satisfaction={} | ease={} | clarity={} | confidence={:.2} | micro_question={}",
            self.tone,
            self.scores.satisfaction,
            self.scores.ease,
            self.scores.clarity,
            self.confidence,
            self.micro_question.as_deref().unwrap_or("-")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_report() -> Report {
        Report {
            scores: Scores { satisfaction: 4, ease: 4, clarity: 5 },
            tone: Tone::Positive,
            insights: vec!["Average engagement was 85%.".to_string()],
            moments: Moments {
                stress: vec![StressMoment { t: 3.0, hr: 85, br: 17 }],
                engagement_low: vec![EngagementMoment { t: 5.0, eng: 0.65 }],
            },
            micro_question: None,
            confidence: 1.0,
        }
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(make_report()).unwrap();
        assert_eq!(json["tone"], "Positive");
        assert_eq!(json["scores"]["clarity"], 5);
        assert!(json["microQuestion"].is_null());
        assert_eq!(json["moments"]["engagementLow"][0]["eng"], 0.65);
    }

    #[test]
    fn test_parseable_string() {
        let s = make_report().to_parseable_string();
        assert!(s.starts_with("tone=Positive"));
        assert!(s.ends_with("micro_question=-"));
    }
}
