//! Async 1 Hz sampling loop and its start/stop controller

use anyhow::{bail, Context, Result};
use log::info;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::sampler::{SampleReader, SessionSampler};
use crate::types::MetricPoint;

pub type SharedSampler = Arc<Mutex<SessionSampler>>;

/// Session-relative time in seconds
///
/// Built on the tokio clock so paused-time tests advance it.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    origin: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Tick the sampler every `period` until cancelled or the session closes
pub async fn sampling_loop(
    sampler: SharedSampler,
    reader: SampleReader,
    clock: SessionClock,
    period: Duration,
    updates: Option<broadcast::Sender<MetricPoint>>,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let t = clock.now();
                let latest = reader.latest();
                let point = {
                    let mut guard = sampler.lock().await;
                    if !guard.is_open() {
                        info!("session closed, sampling loop exiting");
                        break;
                    }
                    guard.tick(t, latest.as_ref())
                };

                if let (Some(point), Some(tx)) = (point, updates.as_ref()) {
                    // No subscribers is fine
                    let _ = tx.send(point);
                }
            }
            _ = cancel_token.cancelled() => {
                info!("sampling loop shutting down");
                break;
            }
        }
    }
}

/// Owns the running loop for one session
#[derive(Debug, Default)]
pub struct SamplingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SamplingController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn start(
        &mut self,
        sampler: SharedSampler,
        reader: SampleReader,
        clock: SessionClock,
        period: Duration,
        updates: Option<broadcast::Sender<MetricPoint>>,
    ) -> Result<()> {
        if self.is_running() {
            bail!("sampling already active");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sampling_loop(
            sampler,
            reader,
            clock,
            period,
            updates,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await.context("sampling loop task failed to join")
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
