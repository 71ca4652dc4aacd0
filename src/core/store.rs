//! Session store: one JSON slot on disk, last write wins
//!
//! The slot holds the payload text plus its SHA-256 digest. A slot that
//! fails to parse or whose digest does not match reads back as "no session".

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::SessionPayload;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session store JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored session digest mismatch")]
    DigestMismatch,
    #[error("unsupported store version {0}")]
    Version(u32),
}

/// On-disk envelope
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    version: u32,
    saved_at: DateTime<Utc>,
    digest: String,
    payload: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the slot
    pub fn save(&self, payload: &SessionPayload) -> Result<(), StoreError> {
        let text = serde_json::to_string(payload)?;
        let stored = StoredSession {
            version: STORE_VERSION,
            saved_at: Utc::now(),
            digest: sha256_hex(text.as_bytes()),
            payload: text,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        info!(
            "saved session ({} points, {} snapshots) to {}",
            payload.points.len(),
            payload.snapshots.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the slot; `Ok(None)` when empty
    pub fn try_load(&self) -> Result<Option<SessionPayload>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredSession = serde_json::from_str(&text)?;
        if stored.version != STORE_VERSION {
            return Err(StoreError::Version(stored.version));
        }
        if sha256_hex(stored.payload.as_bytes()) != stored.digest {
            return Err(StoreError::DigestMismatch);
        }
        Ok(Some(serde_json::from_str(&stored.payload)?))
    }

    /// Read the slot; anything unreadable counts as no session
    pub fn load(&self) -> Option<SessionPayload> {
        match self.try_load() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("ignoring stored session at {}: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Empty the slot
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect()
}

// =============================================================================
// TESTS
// =============================================================================
