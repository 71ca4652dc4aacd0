//! Session Sampler: 1 Hz coordinator owning all per-session state
//!
//! Per tick (only while the session is open):
//! 1. latest feature sample, or no-face defaults if missing/stale
//! 2. eyes-closed duration
//! 3. emotion
//! 4. metric point with synthetic vitals
//! 5. confusion check → capture trigger
//! 6. append (timestamps strictly increasing)

use std::sync::Arc;
use log::{debug, info};
use tokio::sync::watch;

use crate::config::PipelineConfig;
use crate::core::capture::{CaptureTrigger, SurfaceCapture};
use crate::core::confusion::is_confusion_candidate;
use crate::core::emotion::EmotionClassifier;
use crate::round_to;
use crate::types::{EventKind, FeatureSample, MetricPoint, SessionEvent, SessionMode, SessionPayload};

// =============================================================================
// LATEST-SAMPLE CELL
// =============================================================================

/// Create the single-slot cell between the landmark loop and the sampler
pub fn sample_channel() -> (SamplePublisher, SampleReader) {
    let (tx, rx) = watch::channel(None);
    (SamplePublisher { tx }, SampleReader { rx })
}

/// Writer side; each publish overwrites the previous sample
#[derive(Debug)]
pub struct SamplePublisher {
    tx: watch::Sender<Option<FeatureSample>>,
}

impl SamplePublisher {
    pub fn publish(&self, sample: FeatureSample) {
        self.tx.send_replace(Some(sample));
    }

    pub fn subscribe(&self) -> SampleReader {
        SampleReader { rx: self.tx.subscribe() }
    }
}

/// Reader side; never blocks
#[derive(Debug, Clone)]
pub struct SampleReader {
    rx: watch::Receiver<Option<FeatureSample>>,
}

impl SampleReader {
    pub fn latest(&self) -> Option<FeatureSample> {
        self.rx.borrow().clone()
    }
}

// =============================================================================
// EYES-CLOSED TRACKER
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct EyesClosedTracker {
    since: Option<f64>,
}

impl EyesClosedTracker {
    /// Update with this tick and return the continuous closed duration
    pub fn update(&mut self, eyes_closed: bool, t: f64) -> f64 {
        if !eyes_closed {
            self.since = None;
            return 0.0;
        }
        let start = *self.since.get_or_insert(t);
        t - start
    }

    pub fn reset(&mut self) {
        self.since = None;
    }
}

// =============================================================================
// SYNTHETIC VITALS
// =============================================================================

/// Placeholder heart/breath rate; not a measurement
pub fn synthetic_vitals(t: f64, task_running: bool) -> (u32, u32) {
    let (hr_bump, br_bump) = if task_running { (4.0, 1.0) } else { (0.0, 0.0) };
    let hr = 75.0 + (10.0 * (t / 2.0).sin()).round() + hr_bump;
    let br = 15.0 + (2.0 * (t / 3.0).sin()).round() + br_bump;
    (hr as u32, br as u32)
}

// =============================================================================
// SESSION SAMPLER
// =============================================================================

pub struct SessionSampler {
    config: PipelineConfig,
    payload: SessionPayload,
    classifier: EmotionClassifier,
    eyes: EyesClosedTracker,
    trigger: CaptureTrigger,
    surface: Option<Arc<dyn SurfaceCapture>>,
    open: bool,
    video_time: Option<f64>,
}

impl SessionSampler {
    pub fn new(mode: SessionMode, config: PipelineConfig) -> Self {
        Self {
            classifier: EmotionClassifier::new(config.emotion.clone()),
            trigger: CaptureTrigger::new(config.capture.clone()),
            eyes: EyesClosedTracker::default(),
            payload: SessionPayload::new(mode),
            surface: None,
            open: false,
            video_time: None,
            config,
        }
    }

    /// Attach the surface captured on confusion candidates
    pub fn with_surface(mut self, surface: Arc<dyn SurfaceCapture>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> SessionMode {
        self.payload.mode
    }

    /// Playback position of a recorded stimulus, stamped onto new points
    pub fn set_video_time(&mut self, video_time: Option<f64>) {
        self.video_time = video_time;
    }

    /// Apply a session event
    ///
    /// Start events open a fresh window (buffers and state cleared); end
    /// events close it. Everything else is appended as-is.
    pub fn record_event(&mut self, event: SessionEvent) {
        if event.kind.opens_session() {
            let mode = match event.kind {
                EventKind::ActivityStart => SessionMode::Activity,
                _ => SessionMode::Task,
            };
            self.payload = SessionPayload::new(mode);
            self.classifier.reset();
            self.eyes.reset();
            self.trigger.reset();
            self.open = true;
            info!("{:?} session opened at t={:.1}", mode, event.timestamp);
            self.payload.events.push(event);
        } else if event.kind.closes_session() {
            self.payload.events.push(event);
            self.stop();
        } else {
            debug!("event {:?} at t={:.1}", event.kind, event.timestamp);
            self.payload.events.push(event);
        }
    }

    /// Run one tick at session time `t`
    ///
    /// Returns the appended point, or `None` when closed or when `t` does not
    /// advance past the previous point.
    pub fn tick(&mut self, t: f64, latest: Option<&FeatureSample>) -> Option<MetricPoint> {
        if !self.open {
            return None;
        }

        let timestamp = round_to(t, 1);
        if let Some(last) = self.payload.last_timestamp() {
            if timestamp <= last {
                debug!("dropping tick at t={:.1}, not after {:.1}", timestamp, last);
                return None;
            }
        }

        let stale_after = self.config.sampler.stale_after_secs;
        let sample = match latest {
            Some(s) if t - s.timestamp <= stale_after => s.clone(),
            _ => FeatureSample::absent(t, false),
        };

        let eyes_closed_for = self.eyes.update(sample.eyes_closed, t);
        let emotion = self.classifier.classify(&sample, t);

        let task_running = self.payload.mode == SessionMode::Task;
        let (hr, br) = synthetic_vitals(t, task_running);

        let mut point = MetricPoint::from_sample(timestamp, &sample, emotion)
            .with_vitals(hr, br)
            .with_video_time(self.video_time);
        point.smile_ratio = round_to(sample.smile_ratio, 2);

        let candidate = is_confusion_candidate(
            &point,
            self.open,
            eyes_closed_for,
            &self.config.engagement,
            &self.config.confusion,
        );
        if candidate {
            let result = self.trigger.try_capture(t, self.surface.as_deref());
            debug!("confusion candidate at t={:.1}: {}", timestamp, result.reason);
            if let Some(snapshot) = result.snapshot {
                self.payload.snapshots.push(snapshot);
            }
        }

        debug!(
            "tick t={:.1} face={} gaze={} smile={:.2} emotion={}",
            point.timestamp, point.face_present, point.gaze, point.smile_ratio, point.emotion
        );
        self.payload.points.push(point.clone());
        Some(point)
    }

    /// Close the session, releasing classifier and tracker state
    ///
    /// Points, snapshots and events are kept.
    pub fn stop(&mut self) {
        if self.open {
            info!(
                "session closed with {} points, {} snapshots",
                self.payload.points.len(),
                self.payload.snapshots.len()
            );
        }
        self.open = false;
        self.classifier.reset();
        self.eyes.reset();
    }

    pub fn payload(&self) -> &SessionPayload {
        &self.payload
    }

    pub fn into_payload(self) -> SessionPayload {
        self.payload
    }
}

impl std::fmt::Debug for SessionSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSampler")
            .field("mode", &self.payload.mode)
            .field("open", &self.open)
            .field("points", &self.payload.points.len())
            .field("snapshots", &self.payload.snapshots.len())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
