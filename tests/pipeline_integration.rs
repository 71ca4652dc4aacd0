//! Integration tests for the signal pipeline
//!
//! landmarks → extractor → sampler → report, driven synchronously

mod common;

use common::Face;
use inshight::config::PipelineConfig;
use inshight::core::{
    generate_report, parse_frames, CaptureError, FeatureExtractor, Replayer, SessionSampler, SurfaceCapture,
};
use inshight::types::{Emotion, EventKind, GazeZone, SessionEvent, SessionMode, SnapshotKind, Tone};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Screen;

impl SurfaceCapture for Screen {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::Screen
    }
    fn render(&self) -> Result<String, CaptureError> {
        Ok("data:image/jpeg;base64,/9j/".to_string())
    }
}

/// One tick per second, feeding one extracted frame just before each tick
fn run_session(faces: &[Option<Face>]) -> inshight::types::SessionPayload {
    let config = PipelineConfig::default();
    let mut extractor = FeatureExtractor::new(config.features.clone());
    let mut sampler = SessionSampler::new(SessionMode::Task, config).with_surface(Arc::new(Screen));
    sampler.record_event(SessionEvent::new(0.0, EventKind::TaskStart));

    for (i, face) in faces.iter().enumerate() {
        let t = i as f64;
        let landmarks = face.map(|f| f.landmarks());
        let sample = extractor.extract(landmarks.as_deref(), t);
        sampler.tick(t, Some(&sample));
    }

    let end = faces.len() as f64;
    sampler.record_event(SessionEvent::new(end, EventKind::TaskEnd));
    sampler.into_payload()
}

#[test]
fn test_smiling_session_reports_positive() {
    let payload = run_session(&vec![Some(Face::smiling()); 20]);

    assert_eq!(payload.points.len(), 20);
    assert!(payload.points.iter().all(|p| p.emotion == Emotion::Positive));
    assert!(payload.points.iter().all(|p| p.gaze == GazeZone::Center));
    assert!(payload.snapshots.is_empty());

    let report = generate_report(&payload, &PipelineConfig::default()).unwrap();
    assert_eq!(report.tone, Tone::Positive);
    assert_eq!(report.micro_question, None);
    assert!(report.insights[0].starts_with("Average engagement was 85%"));
}

#[test]
fn test_sustained_frown_escalates_and_captures() {
    let payload = run_session(&vec![Some(Face::frowning()); 8]);

    let emotions: Vec<Emotion> = payload.points.iter().map(|p| p.emotion).collect();
    assert_eq!(&emotions[..4], &[Emotion::Concentration; 4]);
    assert!(emotions[4..].iter().all(|e| *e == Emotion::Frustration));

    // Frustration is a confusion trigger: first capture at t=4, next at t=7
    let times: Vec<f64> = payload.snapshots.iter().map(|s| s.timestamp).collect();
    assert_eq!(times, vec![4.0, 7.0]);

    let report = generate_report(&payload, &PipelineConfig::default()).unwrap();
    assert_eq!(report.tone, Tone::Negative);
}

#[test]
fn test_face_lost_goes_off_screen() {
    let mut faces = vec![Some(Face::default()); 3];
    faces.extend(vec![None; 3]);
    let payload = run_session(&faces);

    assert!(payload.points[2].face_present);
    assert!(!payload.points[3].face_present);
    // Last face seen at t=2; 1 s later is past the 600 ms limit
    assert!(payload.points[3].off_screen);
    assert_eq!(payload.points[3].gaze, GazeZone::Unknown);

    let report = generate_report(&payload, &PipelineConfig::default()).unwrap();
    assert!(report.micro_question.is_some());
    assert_eq!(report.moments.engagement_low[0].t, 3.0);
}

#[test]
fn test_raised_brows_read_as_confusion_and_mixed_tone() {
    let confused = Face { brow_gap: 0.03, ..Face::default() };
    let payload = run_session(&vec![Some(confused); 6]);

    assert!(payload.points.iter().all(|p| p.emotion == Emotion::Confusion && p.eyebrow_raised));
    let report = generate_report(&payload, &PipelineConfig::default()).unwrap();
    assert_eq!(report.tone, Tone::Mixed);
}

#[test]
fn test_long_blink_is_confusion_candidate() {
    let closed = Face { openness: 0.05, ..Face::default() };
    let mut faces = vec![Some(Face::default()); 3];
    faces.extend(vec![Some(closed); 4]);
    let payload = run_session(&faces);

    assert!(payload.points[3].eyes_closed);
    // Engagement is already 0.20 when eyes close, so capture starts right away
    assert_eq!(payload.snapshots.first().map(|s| s.timestamp), Some(3.0));
}

#[test]
fn test_replay_from_jsonl() {
    let smile = Face::smiling().pairs();
    let mut lines = Vec::new();
    lines.push(r#"{"t": 0.0, "landmarks": null, "event": "task_start"}"#.to_string());
    for i in 1..=50 {
        let frame = serde_json::json!({ "t": i as f64 * 0.1, "landmarks": smile });
        lines.push(frame.to_string());
    }
    lines.push(r#"{"t": 5.05, "landmarks": null, "event": "task_end"}"#.to_string());
    let input = lines.join("\n");

    let frames = parse_frames(input.as_bytes()).unwrap();
    let payload = Replayer::new(SessionMode::Task, PipelineConfig::default()).run(&frames);

    let times: Vec<f64> = payload.points.iter().map(|p| p.timestamp).collect();
    assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(payload.points[1..].iter().all(|p| p.emotion == Emotion::Positive));

    let kinds: Vec<EventKind> = payload.events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::TaskStart, EventKind::TaskEnd]);
}
