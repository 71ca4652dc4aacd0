//! Pipeline configuration
//!
//! Every threshold is tunable. Missing fields fall back to the `[C]`
//! constants in the crate root, so an empty `{}` file is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::{
    CONFUSION_ENGAGEMENT, CONFUSION_EYES_CLOSED_SECS, EMOTION_WINDOW_SECS, ENGAGEMENT_ABSENT,
    ENGAGEMENT_BASELINE, ENGAGEMENT_EYES_CLOSED, ENGAGEMENT_TASK_BONUS, EYEBROW_RAISE_GAP,
    EYE_CLOSED_RATIO, FRUSTRATION_TICKS, GAZE_HIGH_SPLIT, GAZE_LOW_SPLIT, MAX_SNAPSHOTS,
    MIN_LANDMARKS, OFF_SCREEN_AFTER_MS, SAMPLE_PERIOD_MS, SAMPLE_STALE_SECS, SMILE_FROWN_RATIO,
    SMILE_POSITIVE_RATIO, SNAPSHOT_COOLDOWN_SECS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub emotion: EmotionConfig,
    #[serde(default)]
    pub engagement: EngagementConfig,
    #[serde(default)]
    pub confusion: ConfusionConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub ask: AskConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub min_landmarks: usize,
    pub off_screen_after_ms: u64,
    pub eye_closed_ratio: f64,
    pub gaze_low_split: f64,
    pub gaze_high_split: f64,
    pub eyebrow_raise_gap: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_landmarks: MIN_LANDMARKS,
            off_screen_after_ms: OFF_SCREEN_AFTER_MS,
            eye_closed_ratio: EYE_CLOSED_RATIO,
            gaze_low_split: GAZE_LOW_SPLIT,
            gaze_high_split: GAZE_HIGH_SPLIT,
            eyebrow_raise_gap: EYEBROW_RAISE_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionConfig {
    pub smile_positive_ratio: f64,
    pub smile_frown_ratio: f64,
    pub window_secs: f64,
    pub frustration_ticks: usize,
}

impl Default for EmotionConfig {
    fn default() -> Self {
        Self {
            smile_positive_ratio: SMILE_POSITIVE_RATIO,
            smile_frown_ratio: SMILE_FROWN_RATIO,
            window_secs: EMOTION_WINDOW_SECS,
            frustration_ticks: FRUSTRATION_TICKS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementConfig {
    pub baseline: f64,
    pub absent: f64,
    pub eyes_closed: f64,
    pub task_bonus: f64,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            baseline: ENGAGEMENT_BASELINE,
            absent: ENGAGEMENT_ABSENT,
            eyes_closed: ENGAGEMENT_EYES_CLOSED,
            task_bonus: ENGAGEMENT_TASK_BONUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfusionConfig {
    pub engagement_threshold: f64,
    pub eyes_closed_secs: f64,
}

impl Default for ConfusionConfig {
    fn default() -> Self {
        Self {
            engagement_threshold: CONFUSION_ENGAGEMENT,
            eyes_closed_secs: CONFUSION_EYES_CLOSED_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub cooldown_secs: f64,
    pub max_snapshots: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: SNAPSHOT_COOLDOWN_SECS,
            max_snapshots: MAX_SNAPSHOTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub period_ms: u64,
    pub stale_after_secs: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            period_ms: SAMPLE_PERIOD_MS,
            stale_after_secs: SAMPLE_STALE_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AskConfig {
    /// OpenAI-compatible chat completions URL
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Points included verbatim in the LLM summary
    pub sample_points: usize,
}

impl Default for AskConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            sample_points: 10,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall the sampling grid or lift the snapshot cap
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampler.period_ms == 0 {
            return Err(ConfigError::Invalid("sampler.period_ms must be > 0".to_string()));
        }
        if !(self.emotion.window_secs > 0.0) {
            return Err(ConfigError::Invalid("emotion.window_secs must be > 0".to_string()));
        }
        if self.emotion.frustration_ticks == 0 {
            return Err(ConfigError::Invalid("emotion.frustration_ticks must be > 0".to_string()));
        }
        if !(self.capture.cooldown_secs > 0.0) {
            return Err(ConfigError::Invalid("capture.cooldown_secs must be > 0".to_string()));
        }
        if self.capture.max_snapshots > MAX_SNAPSHOTS {
            return Err(ConfigError::Invalid(format!(
                "capture.max_snapshots must be <= {}",
                MAX_SNAPSHOTS
            )));
        }
        Ok(())
    }

    /// Load from `path` if given, otherwise defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::default()),
        }
    }
}
