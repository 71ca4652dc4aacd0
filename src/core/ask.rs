//! Question answering over a session via an OpenAI-compatible chat endpoint
//!
//! Only a summary goes over the wire: counts, events, the first few points
//! and snapshot ids. Image data never leaves the machine.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AskConfig;
use crate::types::SessionPayload;

pub const NO_ANSWER: &str = "No response from AI.";

const SYSTEM_PROMPT: &str = "You are Inshight Analyst. You read behavioral signal data \
recorded during an Inshight session and explain it to the person who ran the session.

You receive:
- points: 1 Hz samples (t, gaze, emotion, smile, facePresent, offScreen, eyesClosed, hr, br)
- events: session markers such as task_start and task_end
- snapshotIds: screenshots taken at likely confusion moments, by time

Reply with a short summary of the session in plain language, a few bullet-point \
insights, and then a direct answer to the question. Cite timestamps when you refer \
to specific moments, and mention snapshots by their time when they are relevant.";

#[derive(Debug, Error)]
pub enum AskError {
    #[error("API key not set (expected in ${0})")]
    MissingKey(String),
    #[error("question is empty")]
    EmptyQuestion,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat endpoint returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Compact view of a session for the model
pub fn build_summary(payload: &SessionPayload, sample_points: usize) -> Value {
    let snapshot_ids: Vec<Value> = payload
        .snapshots
        .iter()
        .map(|s| json!({ "imageId": s.image_id, "t": s.timestamp }))
        .collect();
    let samples = &payload.points[..payload.points.len().min(sample_points)];

    json!({
        "mode": payload.mode,
        "startedAt": payload.started_at,
        "totalPoints": payload.points.len(),
        "totalSnapshots": payload.snapshots.len(),
        "events": payload.events,
        "samplePoints": samples,
        "snapshotIds": snapshot_ids,
    })
}

fn user_message(question: &str, summary: &Value) -> String {
    let data = serde_json::to_string_pretty(summary).unwrap_or_else(|_| summary.to_string());
    format!(
        "Session Data:\n{}\n\nUser Question: {}\n\nAnalyze this session and answer the question. \
         Cover engagement patterns, emotional states, confusion moments and anything else notable.",
        data, question
    )
}

/// First choice's text, or the fallback string
fn extract_answer(response: ChatResponse) -> String {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| NO_ANSWER.to_string())
}

#[derive(Debug, Clone)]
pub struct AskClient {
    http: reqwest::Client,
    config: AskConfig,
    api_key: String,
}

impl AskClient {
    pub fn new(config: AskConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    /// Read the key from the configured environment variable
    pub fn from_env(config: AskConfig) -> Result<Self, AskError> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AskError::MissingKey(config.api_key_env.clone()))?;
        Ok(Self::new(config, key))
    }

    pub async fn ask(&self, question: &str, payload: &SessionPayload) -> Result<String, AskError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AskError::EmptyQuestion);
        }

        let summary = build_summary(payload, self.config.sample_points);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user", content: user_message(question, &summary) },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("asking {} about a session with {} points", self.config.endpoint, payload.points.len());
        let resp = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body: Value = resp.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            warn!("chat endpoint error {}: {}", status, message);
            return Err(AskError::Api { status: status.as_u16(), message });
        }

        let parsed: ChatResponse = resp.json().await?;
        Ok(extract_answer(parsed))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Emotion, EventKind, FeatureSample, MetricPoint, SessionEvent, SessionMode, Snapshot, SnapshotKind,
    };
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn payload_with(points: usize) -> SessionPayload {
        let mut p = SessionPayload::new(SessionMode::Task);
        p.events.push(SessionEvent::new(0.0, EventKind::TaskStart));
        for i in 0..points {
            let t = i as f64;
            p.points.push(MetricPoint::from_sample(t, &FeatureSample::absent(t, false), Emotion::Neutral));
        }
        p.snapshots.push(Snapshot {
            image_id: "snap_3_1".to_string(),
            timestamp: 3.0,
            kind: SnapshotKind::Screen,
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
            label: None,
        });
        p
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1/chat/completions", addr)
    }

    fn config_for(endpoint: String) -> AskConfig {
        AskConfig { endpoint, ..Default::default() }
    }

    #[test]
    fn test_summary_shape() {
        let summary = build_summary(&payload_with(25), 10);
        assert_eq!(summary["mode"], "task");
        assert_eq!(summary["totalPoints"], 25);
        assert_eq!(summary["totalSnapshots"], 1);
        assert_eq!(summary["samplePoints"].as_array().unwrap().len(), 10);
        assert_eq!(summary["snapshotIds"][0]["imageId"], "snap_3_1");
        assert!(summary["snapshotIds"][0].get("dataUrl").is_none());
        assert_eq!(summary["events"][0]["type"], "task_start");
    }

    #[test]
    fn test_summary_short_session() {
        let summary = build_summary(&payload_with(3), 10);
        assert_eq!(summary["samplePoints"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_extract_answer_fallback() {
        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(extract_answer(empty), NO_ANSWER);

        let null_content: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(extract_answer(null_content), NO_ANSWER);

        let ok: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"Engaged."}}]}"#).unwrap();
        assert_eq!(extract_answer(ok), "Engaged.");
    }

    #[test]
    fn test_missing_key() {
        let config = AskConfig {
            api_key_env: "INSHIGHT_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(AskClient::from_env(config), Err(AskError::MissingKey(_))));
    }

    #[tokio::test]
    async fn test_empty_question() {
        let client = AskClient::new(AskConfig::default(), "k");
        let err = client.ask("   ", &payload_with(1)).await.unwrap_err();
        assert!(matches!(err, AskError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_round_trip_against_local_endpoint() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_string();
                let answer = if user.contains("User Question: where did they struggle?")
                    && body["model"] == "gpt-4o-mini"
                    && body["max_tokens"] == 2000
                {
                    "Around t=3s."
                } else {
                    "unexpected request"
                };
                Json(json!({ "choices": [{ "message": { "content": answer } }] }))
            }),
        );
        let client = AskClient::new(config_for(serve(router).await), "test-key");

        let answer = client.ask("where did they struggle?", &payload_with(5)).await.unwrap();
        assert_eq!(answer, "Around t=3s.");
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "bad key" } })),
                )
            }),
        );
        let client = AskClient::new(config_for(serve(router).await), "wrong");

        match client.ask("hello", &payload_with(1)).await {
            Err(AskError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }
}
