//! Emotion labels

use serde::{Deserialize, Serialize};

/// The six fixed emotion labels a metric point can carry
///
/// `Negative` is accepted on input and honored by the confusion and tone
/// checks, but the classifier never emits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Positive,
    #[default]
    Neutral,
    Negative,
    Concentration,
    Frustration,
    Confusion,
}

impl Emotion {
    /// Counts toward the negative side of the tone split
    pub fn is_negative(&self) -> bool {
        matches!(self, Emotion::Negative | Emotion::Frustration)
    }

    /// Valence used by the emotion timeline
    pub fn valence(&self) -> f64 {
        match self {
            Emotion::Positive => 1.0,
            Emotion::Neutral => 0.5,
            Emotion::Negative => -0.5,
            Emotion::Concentration => 0.3,
            Emotion::Frustration => -0.3,
            Emotion::Confusion => -0.2,
        }
    }

    /// Lowercase label, same as the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Positive => "positive",
            Emotion::Neutral => "neutral",
            Emotion::Negative => "negative",
            Emotion::Concentration => "concentration",
            Emotion::Frustration => "frustration",
            Emotion::Confusion => "confusion",
        }
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
