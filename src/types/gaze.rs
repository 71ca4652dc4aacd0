//! Gaze zone definitions

use serde::{Deserialize, Serialize};
use crate::{GAZE_HIGH_SPLIT, GAZE_LOW_SPLIT};

/// Nine screen zones plus unknown (no usable iris geometry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GazeZone {
    UpperLeft,
    UpperCenter,
    UpperRight,
    Left,
    Center,
    Right,
    LowerLeft,
    LowerCenter,
    LowerRight,
    #[default]
    Unknown,
}

/// Vertical band of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Upper,
    Middle,
    Lower,
}

/// Horizontal column of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Left,
    Center,
    Right,
}

impl GazeZone {
    /// All zones in display order (row-major, unknown last)
    pub const ALL: [GazeZone; 10] = [
        GazeZone::UpperLeft,
        GazeZone::UpperCenter,
        GazeZone::UpperRight,
        GazeZone::Left,
        GazeZone::Center,
        GazeZone::Right,
        GazeZone::LowerLeft,
        GazeZone::LowerCenter,
        GazeZone::LowerRight,
        GazeZone::Unknown,
    ];

    /// Classify with the default 0.35 / 0.65 splits
    ///
    /// `h_ratio`: 0 = left, 1 = right. `v_ratio`: 0 = up, 1 = down.
    pub fn classify(h_ratio: f64, v_ratio: f64) -> Self {
        Self::classify_with(h_ratio, v_ratio, GAZE_LOW_SPLIT, GAZE_HIGH_SPLIT)
    }

    /// Classify with explicit splits; each axis is banded independently
    pub fn classify_with(h_ratio: f64, v_ratio: f64, low: f64, high: f64) -> Self {
        let band = if v_ratio < low {
            Band::Upper
        } else if v_ratio > high {
            Band::Lower
        } else {
            Band::Middle
        };
        let column = if h_ratio < low {
            Column::Left
        } else if h_ratio > high {
            Column::Right
        } else {
            Column::Center
        };

        match (band, column) {
            (Band::Upper, Column::Left) => GazeZone::UpperLeft,
            (Band::Upper, Column::Center) => GazeZone::UpperCenter,
            (Band::Upper, Column::Right) => GazeZone::UpperRight,
            (Band::Middle, Column::Left) => GazeZone::Left,
            (Band::Middle, Column::Center) => GazeZone::Center,
            (Band::Middle, Column::Right) => GazeZone::Right,
            (Band::Lower, Column::Left) => GazeZone::LowerLeft,
            (Band::Lower, Column::Center) => GazeZone::LowerCenter,
            (Band::Lower, Column::Right) => GazeZone::LowerRight,
        }
    }

    /// Classify when either ratio may be missing
    pub fn from_ratios(h_ratio: Option<f64>, v_ratio: Option<f64>, low: f64, high: f64) -> Self {
        match (h_ratio, v_ratio) {
            (Some(h), Some(v)) => Self::classify_with(h, v, low, high),
            _ => GazeZone::Unknown,
        }
    }

    /// Stable label used in JSON and terminal output
    pub fn label(&self) -> &'static str {
        match self {
            GazeZone::UpperLeft => "upper-left",
            GazeZone::UpperCenter => "upper-center",
            GazeZone::UpperRight => "upper-right",
            GazeZone::Left => "left",
            GazeZone::Center => "center",
            GazeZone::Right => "right",
            GazeZone::LowerLeft => "lower-left",
            GazeZone::LowerCenter => "lower-center",
            GazeZone::LowerRight => "lower-right",
            GazeZone::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for GazeZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
