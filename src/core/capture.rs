//! Snapshot capture trigger
//!
//! Key invariant: at most one snapshot per cooldown (3 s) and at most 25 per
//! session, enforced here at creation time. Skips are not errors; each one
//! carries a reason code.

use std::sync::{Arc, RwLock};
use log::{debug, warn};
use thiserror::Error;

use crate::config::CaptureConfig;
use crate::types::{CaptureReason, CaptureResult, Snapshot, SnapshotKind, CONFUSION_LABEL};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no frame available on the {0:?} surface")]
    Unavailable(SnapshotKind),
    #[error("render failed: {0}")]
    Render(String),
}

/// Something that can render the current visual surface to an image
pub trait SurfaceCapture: Send + Sync {
    fn kind(&self) -> SnapshotKind;

    /// Encoded image (data URL)
    fn render(&self) -> Result<String, CaptureError>;
}

/// Surface fed from outside (e.g. frames pushed over HTTP)
///
/// Cloning shares the same slot.
#[derive(Debug, Clone)]
pub struct SharedSurface {
    kind: SnapshotKind,
    latest: Arc<RwLock<Option<String>>>,
}

impl SharedSurface {
    pub fn new(kind: SnapshotKind) -> Self {
        Self {
            kind,
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the current frame
    pub fn update(&self, image_data: String) {
        if let Ok(mut slot) = self.latest.write() {
            *slot = Some(image_data);
        }
    }

    pub fn has_frame(&self) -> bool {
        self.latest.read().map(|s| s.is_some()).unwrap_or(false)
    }
}

impl SurfaceCapture for SharedSurface {
    fn kind(&self) -> SnapshotKind {
        self.kind
    }

    fn render(&self) -> Result<String, CaptureError> {
        let slot = self
            .latest
            .read()
            .map_err(|_| CaptureError::Render("surface lock poisoned".to_string()))?;
        slot.clone().ok_or(CaptureError::Unavailable(self.kind))
    }
}

/// Rate-limited snapshot creation for one session
#[derive(Debug, Clone)]
pub struct CaptureTrigger {
    config: CaptureConfig,
    last_capture: Option<f64>,
    captured: usize,
}

impl Default for CaptureTrigger {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl CaptureTrigger {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            last_capture: None,
            captured: 0,
        }
    }

    /// Attempt a capture at time `t`
    ///
    /// Render errors are logged and swallowed. The cooldown only advances on
    /// a successful capture.
    pub fn try_capture(&mut self, t: f64, surface: Option<&dyn SurfaceCapture>) -> CaptureResult {
        if self.captured >= self.config.max_snapshots {
            return CaptureResult::skipped(CaptureReason::R102_CAPTURE_CAP_REACHED);
        }

        if let Some(last) = self.last_capture {
            if t - last < self.config.cooldown_secs {
                return CaptureResult::skipped(CaptureReason::R101_CAPTURE_COOLDOWN);
            }
        }

        let Some(surface) = surface else {
            return CaptureResult::skipped(CaptureReason::R103_CAPTURE_NO_SURFACE);
        };

        let image_data = match surface.render() {
            Ok(data) => data,
            Err(e) => {
                warn!("snapshot at t={:.1} skipped: {}", t, e);
                return CaptureResult::skipped(CaptureReason::R104_CAPTURE_RENDER_FAILED);
            }
        };

        self.captured += 1;
        self.last_capture = Some(t);

        let snapshot = Snapshot {
            image_id: format!("snap_{}_{}", t.floor() as i64, self.captured),
            timestamp: t,
            kind: surface.kind(),
            image_data,
            label: Some(CONFUSION_LABEL.to_string()),
        };
        debug!("captured {} ({}/{})", snapshot.image_id, self.captured, self.config.max_snapshots);

        CaptureResult::success(snapshot)
    }

    /// Snapshots created since the last reset
    pub fn captured(&self) -> usize {
        self.captured
    }

    /// Clear cooldown and cap (new session)
    pub fn reset(&mut self) {
        self.last_capture = None;
        self.captured = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSurface;

    impl SurfaceCapture for FixedSurface {
        fn kind(&self) -> SnapshotKind {
            SnapshotKind::Screen
        }
        fn render(&self) -> Result<String, CaptureError> {
            Ok("data:image/jpeg;base64,AAAA".to_string())
        }
    }

    struct BrokenSurface;

    impl SurfaceCapture for BrokenSurface {
        fn kind(&self) -> SnapshotKind {
            SnapshotKind::Webcam
        }
        fn render(&self) -> Result<String, CaptureError> {
            Err(CaptureError::Render("canvas tainted".to_string()))
        }
    }

    #[test]
    fn test_ten_ticks_respect_cooldown() {
        let mut trigger = CaptureTrigger::default();
        let taken: Vec<f64> = (0..10)
            .filter_map(|t| trigger.try_capture(t as f64, Some(&FixedSurface)).snapshot)
            .map(|s| s.timestamp)
            .collect();

        assert_eq!(taken, vec![0.0, 3.0, 6.0, 9.0]);
        assert!(taken.len() <= 10 / 3 + 1);
    }

    #[test]
    fn test_hundred_ticks_never_exceed_cap() {
        let config = CaptureConfig { cooldown_secs: 0.0, ..Default::default() };
        let mut trigger = CaptureTrigger::new(config);
        let mut count = 0;
        let mut last_reason = CaptureReason::R100_SNAPSHOT_CAPTURED;
        for t in 0..100 {
            let r = trigger.try_capture(t as f64, Some(&FixedSurface));
            if r.is_success() {
                count += 1;
            }
            last_reason = r.reason;
        }
        assert_eq!(count, 25);
        assert_eq!(last_reason, CaptureReason::R102_CAPTURE_CAP_REACHED);
    }

    #[test]
    fn test_snapshot_fields() {
        let mut trigger = CaptureTrigger::default();
        let snap = trigger.try_capture(12.7, Some(&FixedSurface)).snapshot.unwrap();
        assert_eq!(snap.image_id, "snap_12_1");
        assert_eq!(snap.kind, SnapshotKind::Screen);
        assert_eq!(snap.label.as_deref(), Some(CONFUSION_LABEL));
    }

    #[test]
    fn test_render_failure_is_swallowed() {
        let mut trigger = CaptureTrigger::default();
        let r = trigger.try_capture(0.0, Some(&BrokenSurface));
        assert!(!r.is_success());
        assert_eq!(r.reason, CaptureReason::R104_CAPTURE_RENDER_FAILED);

        // Failed attempt does not start the cooldown
        assert!(trigger.try_capture(1.0, Some(&FixedSurface)).is_success());
    }

    #[test]
    fn test_no_surface() {
        let mut trigger = CaptureTrigger::default();
        let r = trigger.try_capture(0.0, None);
        assert_eq!(r.reason, CaptureReason::R103_CAPTURE_NO_SURFACE);
        assert_eq!(trigger.captured(), 0);
    }

    #[test]
    fn test_shared_surface() {
        let surface = SharedSurface::new(SnapshotKind::Webcam);
        assert!(matches!(surface.render(), Err(CaptureError::Unavailable(SnapshotKind::Webcam))));

        let handle = surface.clone();
        handle.update("data:image/png;base64,BBBB".to_string());
        assert!(surface.has_frame());
        assert_eq!(surface.render().unwrap(), "data:image/png;base64,BBBB");
    }

    #[test]
    fn test_reset() {
        let mut trigger = CaptureTrigger::default();
        trigger.try_capture(0.0, Some(&FixedSurface));
        assert!(!trigger.try_capture(1.0, Some(&FixedSurface)).is_success());
        trigger.reset();
        assert!(trigger.try_capture(1.0, Some(&FixedSurface)).is_success());
    }
}
