//! Offline replay of recorded landmark frames
//!
//! Input is JSON Lines, one frame per line:
//! `{"t": 0.033, "landmarks": [[x, y], ...] | null, "event": "task_start"}`
//!
//! Frames drive the feature extractor at their own rate; the sampler ticks
//! on a fixed grid, reading whatever sample was published last.

use log::{debug, info};
use serde::Deserialize;
use std::io::BufRead;
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::core::capture::SurfaceCapture;
use crate::core::features::FeatureExtractor;
use crate::core::sampler::SessionSampler;
use crate::types::{EventKind, FeatureSample, Landmark, SessionEvent, SessionMode, SessionPayload};
use std::sync::Arc;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read frames: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayFrame {
    pub t: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub event: Option<EventKind>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ReplayFrame {
    fn landmark_vec(&self) -> Option<Vec<Landmark>> {
        self.landmarks
            .as_ref()
            .map(|pts| pts.iter().map(|&[x, y]| Landmark::new(x, y)).collect())
    }
}

/// Parse JSON Lines; blank lines are skipped
pub fn parse_frames<R: BufRead>(reader: R) -> Result<Vec<ReplayFrame>, ReplayError> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line).map_err(|source| ReplayError::Parse { line: i + 1, source })?;
        frames.push(frame);
    }
    Ok(frames)
}

/// Drives extractor and sampler over recorded frames
pub struct Replayer {
    config: PipelineConfig,
    mode: SessionMode,
    surface: Option<Arc<dyn SurfaceCapture>>,
}

impl Replayer {
    pub fn new(mode: SessionMode, config: PipelineConfig) -> Self {
        Self {
            config,
            mode,
            surface: None,
        }
    }

    pub fn with_surface(mut self, surface: Arc<dyn SurfaceCapture>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Run the frames and return the closed session
    ///
    /// Without an explicit start event the session opens at the first
    /// frame; it is closed after the last frame if still open.
    pub fn run(&self, frames: &[ReplayFrame]) -> SessionPayload {
        let mut sampler = SessionSampler::new(self.mode, self.config.clone());
        if let Some(surface) = &self.surface {
            sampler = sampler.with_surface(surface.clone());
        }

        let Some(first) = frames.first() else {
            return sampler.into_payload();
        };

        let mut extractor = FeatureExtractor::starting_at(self.config.features.clone(), first.t);
        let period = self.config.sampler.period_ms as f64 / 1000.0;
        let explicit_start = frames.iter().any(|f| f.event.is_some_and(|e| e.opens_session()));

        if !explicit_start {
            sampler.record_event(SessionEvent::new(first.t, self.start_kind()));
        }

        let mut next_tick = first.t;
        let mut latest: Option<FeatureSample> = None;

        for frame in frames {
            while next_tick < frame.t {
                sampler.tick(next_tick, latest.as_ref());
                next_tick += period;
            }

            if let Some(kind) = frame.event {
                let mut event = SessionEvent::new(frame.t, kind);
                if let Some(note) = &frame.note {
                    event = event.with_note(note.clone());
                }
                if kind.opens_session() {
                    next_tick = frame.t;
                    latest = None;
                }
                sampler.record_event(event);
            }

            let landmarks = frame.landmark_vec();
            latest = Some(extractor.extract(landmarks.as_deref(), frame.t));
        }

        if let Some(last) = frames.last() {
            if next_tick <= last.t {
                sampler.tick(next_tick, latest.as_ref());
            }
            if sampler.is_open() {
                debug!("closing replayed session at t={:.1}", last.t);
                sampler.record_event(SessionEvent::new(last.t, self.end_kind()));
            }
        }

        let payload = sampler.into_payload();
        info!(
            "replayed {} frames into {} points, {} snapshots",
            frames.len(),
            payload.points.len(),
            payload.snapshots.len()
        );
        payload
    }

    fn start_kind(&self) -> EventKind {
        match self.mode {
            SessionMode::Task => EventKind::TaskStart,
            SessionMode::Activity => EventKind::ActivityStart,
        }
    }

    fn end_kind(&self) -> EventKind {
        match self.mode {
            SessionMode::Task => EventKind::TaskEnd,
            SessionMode::Activity => EventKind::ActivityEnd,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
