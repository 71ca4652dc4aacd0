//! Confusion snapshots and capture reason codes

use serde::{Deserialize, Serialize};

/// Which surface a snapshot was rendered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Screen,
    Webcam,
}

/// One captured image tied to a confusion candidate tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// `snap_<whole seconds>_<ordinal>`, e.g. `snap_192_4`
    pub image_id: String,
    #[serde(rename = "t")]
    pub timestamp: f64,
    pub kind: SnapshotKind,
    /// Encoded image, typically a `data:image/jpeg;base64,...` URL
    #[serde(rename = "dataUrl")]
    pub image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Label attached to snapshots taken on confusion candidates
pub const CONFUSION_LABEL: &str = "confusion_candidate";

/// Result of a capture attempt
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// The snapshot, if one was created
    pub snapshot: Option<Snapshot>,
    /// Why it was or wasn't created
    pub reason: CaptureReason,
}

impl CaptureResult {
    /// Create success result
    pub fn success(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            reason: CaptureReason::R100_SNAPSHOT_CAPTURED,
        }
    }

    /// Create skipped/failed result
    pub fn skipped(reason: CaptureReason) -> Self {
        Self {
            snapshot: None,
            reason,
        }
    }

    /// Check if a snapshot was created
    pub fn is_success(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// Reason codes for capture attempts
///
/// None of the skip codes are errors: the trigger silently no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum CaptureReason {
    /// Snapshot created
    R100_SNAPSHOT_CAPTURED,
    /// Inside the cooldown since the previous snapshot
    R101_CAPTURE_COOLDOWN,
    /// Session already holds the maximum number of snapshots
    R102_CAPTURE_CAP_REACHED,
    /// No capture surface attached
    R103_CAPTURE_NO_SURFACE,
    /// Surface failed to render
    R104_CAPTURE_RENDER_FAILED,
}

impl CaptureReason {
    /// Get code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::R100_SNAPSHOT_CAPTURED => "R100_SNAPSHOT_CAPTURED",
            Self::R101_CAPTURE_COOLDOWN => "R101_CAPTURE_COOLDOWN",
            Self::R102_CAPTURE_CAP_REACHED => "R102_CAPTURE_CAP_REACHED",
            Self::R103_CAPTURE_NO_SURFACE => "R103_CAPTURE_NO_SURFACE",
            Self::R104_CAPTURE_RENDER_FAILED => "R104_CAPTURE_RENDER_FAILED",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R100_SNAPSHOT_CAPTURED => "Snapshot captured",
            Self::R101_CAPTURE_COOLDOWN => "Within snapshot cooldown",
            Self::R102_CAPTURE_CAP_REACHED => "Snapshot cap reached",
            Self::R103_CAPTURE_NO_SURFACE => "No capture surface",
            Self::R104_CAPTURE_RENDER_FAILED => "Surface render failed",
        }
    }
}

impl std::fmt::Display for CaptureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let snap = Snapshot {
            image_id: "snap_12_1".to_string(),
            timestamp: 12.0,
            kind: SnapshotKind::Screen,
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            label: Some(CONFUSION_LABEL.to_string()),
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["imageId"], "snap_12_1");
        assert_eq!(json["kind"], "screen");
        assert_eq!(json["dataUrl"], "data:image/jpeg;base64,AAAA");
        assert_eq!(json["label"], "confusion_candidate");
    }

    #[test]
    fn test_result_helpers() {
        let r = CaptureResult::skipped(CaptureReason::R101_CAPTURE_COOLDOWN);
        assert!(!r.is_success());
        assert_eq!(r.reason.code(), "R101_CAPTURE_COOLDOWN");
    }
}
