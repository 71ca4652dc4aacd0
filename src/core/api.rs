//! HTTP + WebSocket API for Inshight
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /session/new - Create session
//! - GET /session/{id} - Session status
//! - POST /session/{id}/event - Record task/activity event (starts/stops sampling)
//! - POST /session/{id}/frame - Push one landmark frame
//! - GET /session/{id}/payload - Full session payload
//! - GET /session/{id}/report - Report (null when no points)
//! - GET /session/{id}/analytics - Chart series
//! - POST /session/{id}/save - Write the session to the store slot
//! - WS /ws/{id} - Live metric points
//! - POST /ask - Ask a question about a session

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::time::Duration;

use crate::config::PipelineConfig;
use crate::core::analytics::{analyze, SessionAnalytics};
use crate::core::ask::{AskClient, AskError};
use crate::core::capture::SharedSurface;
use crate::core::features::FeatureExtractor;
use crate::core::report::generate_report;
use crate::core::runner::{SamplingController, SessionClock, SharedSampler};
use crate::core::sampler::{sample_channel, SamplePublisher, SampleReader, SessionSampler};
use crate::core::store::SessionStore;
use crate::types::{
    EventKind, FeatureSample, Landmark, MetricPoint, Report, SessionEvent, SessionMode, SessionPayload,
    SnapshotKind,
};

/// Session state
pub struct Session {
    pub id: String,
    pub sampler: SharedSampler,
    pub extractor: FeatureExtractor,
    pub publisher: SamplePublisher,
    pub reader: SampleReader,
    pub clock: SessionClock,
    pub controller: SamplingController,
    pub surface: SharedSurface,
    pub update_tx: broadcast::Sender<MetricPoint>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub config: PipelineConfig,
    pub store: SessionStore,
    pub ask: Option<AskClient>,
}

impl AppState {
    /// LLM client comes from the environment; `/ask` answers 503 without it
    pub fn new(config: PipelineConfig, store: SessionStore) -> Self {
        let ask = match AskClient::from_env(config.ask.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("/ask disabled: {}", e);
                None
            }
        };
        Self::with_ask(config, store, ask)
    }

    pub fn with_ask(config: PipelineConfig, store: SessionStore, ask: Option<AskClient>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
            store,
            ask,
        }
    }
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    #[serde(default)]
    pub mode: SessionMode,
}

/// Create new session response
#[derive(Debug, Serialize, Deserialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub mode: SessionMode,
    pub open: bool,
    pub sampling: bool,
    pub points: usize,
    pub snapshots: usize,
    pub events: usize,
    pub last_point: Option<MetricPoint>,
}

/// Record event request
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub note: Option<String>,
}

/// Record event response
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub t: f64,
    pub open: bool,
    pub points: usize,
    pub snapshots: usize,
}

/// One landmark frame
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    /// `[[x, y], ...]` normalized, or null when no face was detected
    pub landmarks: Option<Vec<[f64; 2]>>,
    /// Current screen image (data URL) for confusion snapshots
    pub screen: Option<String>,
    /// Playback position of the stimulus video
    pub video_time: Option<f64>,
}

/// Save response
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub path: String,
}

/// Ask request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub user_question: String,
    pub session: Option<SessionPayload>,
}

/// Ask response
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub result: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

/// Create the API router
pub fn create_router(config: PipelineConfig, store: SessionStore) -> Router {
    router_with_state(Arc::new(AppState::new(config, store)))
}

pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session))
        .route("/session/:id/event", post(record_event))
        .route("/session/:id/frame", post(push_frame))
        .route("/session/:id/payload", get(get_payload))
        .route("/session/:id/report", get(get_report))
        .route("/session/:id/analytics", get(get_analytics))
        .route("/session/:id/save", post(save_session))
        .route("/ws/:id", get(websocket_handler))
        .route("/ask", post(ask))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let (update_tx, _) = broadcast::channel(100);
    let (publisher, reader) = sample_channel();
    let surface = SharedSurface::new(SnapshotKind::Screen);
    let sampler = SessionSampler::new(req.mode, state.config.clone()).with_surface(Arc::new(surface.clone()));

    let session = Session {
        id: session_id.clone(),
        sampler: Arc::new(Mutex::new(sampler)),
        extractor: FeatureExtractor::new(state.config.features.clone()),
        publisher,
        reader,
        clock: SessionClock::start(),
        controller: SamplingController::new(),
        surface,
        update_tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!("created {:?} session {}", req.mode, session_id);

    Json(NewSessionResponse {
        websocket_url: format!("/ws/{}", session_id),
        session_id,
    })
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let sampler = session.sampler.lock().await;
    let payload = sampler.payload();

    Ok(Json(SessionStatusResponse {
        session_id: session.id.clone(),
        mode: sampler.mode(),
        open: sampler.is_open(),
        sampling: session.controller.is_running(),
        points: payload.points.len(),
        snapshots: payload.snapshots.len(),
        events: payload.events.len(),
        last_point: payload.points.last().cloned(),
    }))
}

/// Record an event; start events reset the session clock and begin sampling
async fn record_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EventRequest>,
) -> Result<Json<EventResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    if req.kind.opens_session() {
        session.controller.stop().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        let (publisher, reader) = sample_channel();
        session.publisher = publisher;
        session.reader = reader;
        session.clock = SessionClock::start();
        session.extractor = FeatureExtractor::new(state.config.features.clone());
    }

    let t = session.clock.now();
    let mut event = SessionEvent::new(t, req.kind);
    if let Some(note) = req.note {
        event = event.with_note(note);
    }

    let (open, points, snapshots) = {
        let mut sampler = session.sampler.lock().await;
        sampler.record_event(event);
        let payload = sampler.payload();
        (sampler.is_open(), payload.points.len(), payload.snapshots.len())
    };

    if req.kind.opens_session() {
        session
            .controller
            .start(
                session.sampler.clone(),
                session.reader.clone(),
                session.clock,
                Duration::from_millis(state.config.sampler.period_ms),
                Some(session.update_tx.clone()),
            )
            .map_err(|_| StatusCode::CONFLICT)?;
    } else if req.kind.closes_session() {
        session.controller.stop().await.map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    }

    Ok(Json(EventResponse { t, open, points, snapshots }))
}

/// Push one frame into the latest-sample cell
async fn push_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<FrameRequest>,
) -> Result<Json<FeatureSample>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let landmarks: Option<Vec<Landmark>> = req
        .landmarks
        .map(|points| points.into_iter().map(|[x, y]| Landmark::new(x, y)).collect());
    let now = session.clock.now();
    let sample = session.extractor.extract(landmarks.as_deref(), now);
    session.publisher.publish(sample.clone());

    if let Some(screen) = req.screen {
        session.surface.update(screen);
    }
    if req.video_time.is_some() {
        session.sampler.lock().await.set_video_time(req.video_time);
    }

    Ok(Json(sample))
}

async fn get_payload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionPayload>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let payload = session.sampler.lock().await.payload().clone();
    Ok(Json(payload))
}

/// Report for the session so far; `null` when there are no points
async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Report>>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let sampler = session.sampler.lock().await;
    Ok(Json(generate_report(sampler.payload(), &state.config)))
}

async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionAnalytics>, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let sampler = session.sampler.lock().await;
    Ok(Json(analyze(sampler.payload(), &state.config.engagement)))
}

async fn save_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SaveResponse>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no session {}", id)))?;
    let payload = session.sampler.lock().await.payload().clone();

    state
        .store
        .save(&payload)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(SaveResponse {
        saved: true,
        path: state.store.path().display().to_string(),
    }))
}

/// Answer a question about the supplied session, or the stored one
async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if req.user_question.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing user_question"));
    }
    let payload = req
        .session
        .or_else(|| state.store.load())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No session supplied and none stored"))?;
    let client = state
        .ask
        .as_ref()
        .ok_or_else(|| api_error(StatusCode::SERVICE_UNAVAILABLE, "LLM endpoint not configured"))?;

    match client.ask(&req.user_question, &payload).await {
        Ok(result) => Ok(Json(AskResponse { result })),
        Err(AskError::Api { status, message }) => Err(api_error(
            StatusCode::BAD_GATEWAY,
            format!("LLM API error {}: {}", status, message),
        )),
        Err(e) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward points until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<MetricPoint>) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            update = rx.recv() => {
                let point = match update {
                    Ok(point) => point,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("websocket client lagged, dropped {} points", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let json = serde_json::to_string(&point).unwrap_or_default();
                if sender.send(Message::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    format!("session_{:x}_{}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Run the API server
pub async fn run_server(addr: &str, config: PipelineConfig, store: SessionStore) -> anyhow::Result<()> {
    let router = create_router(config, store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Inshight API running on {}", addr);
    info!("  POST /session/new           - Create session");
    info!("  POST /session/:id/event     - task_start / task_end / spike");
    info!("  POST /session/:id/frame     - Push landmarks");
    info!("  GET  /session/:id/report    - Session report");
    info!("  WS   /ws/:id                - Live points");
    info!("  POST /ask                   - Ask about a session");
    axum::serve(listener, router).await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
