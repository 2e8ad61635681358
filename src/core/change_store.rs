//! Persisted fingerprint of the last rendered snapshot.
//!
//! The state is a single small JSON file. A missing file means "first run"
//! and is not an error.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use super::fingerprint::Fingerprint;
use super::storage::{write_atomic, StorageFailure};

/// What was last rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeState {
    pub fingerprint: Fingerprint,

    /// When the artifact for this fingerprint was written
    pub saved_at: DateTime<Utc>,

    /// Number of raw records in the snapshot
    pub item_count: usize,
}

impl ChangeState {
    pub fn new(fingerprint: Fingerprint, item_count: usize) -> Self {
        Self {
            fingerprint,
            saved_at: Utc::now(),
            item_count,
        }
    }
}

/// Storage for the last-known fingerprint
#[async_trait]
pub trait ChangeStore: Send + Sync {
    /// Last saved state, `None` on first run
    async fn load(&self) -> Result<Option<ChangeState>, StorageFailure>;

    /// Replace the saved state
    async fn save(&self, state: &ChangeState) -> Result<(), StorageFailure>;
}

/// Change state kept in a JSON file
pub struct FileChangeStore {
    path: PathBuf,
}

impl FileChangeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the saved state. Returns whether there was anything to remove.
    pub async fn clear(&self) -> Result<bool, StorageFailure> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StorageFailure::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

#[async_trait]
impl ChangeStore for FileChangeStore {
    async fn load(&self) -> Result<Option<ChangeState>, StorageFailure> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageFailure::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut state: ChangeState =
            serde_json::from_str(&content).map_err(|e| StorageFailure::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        // Stored digests compare in their normalized (lowercase) form
        state.fingerprint = Fingerprint::from_hex(state.fingerprint.as_str()).ok_or_else(|| {
            StorageFailure::Corrupt {
                path: self.path.clone(),
                reason: format!("not a fingerprint: {:?}", state.fingerprint.as_str()),
            }
        })?;

        Ok(Some(state))
    }

    async fn save(&self, state: &ChangeState) -> Result<(), StorageFailure> {
        let json = serde_json::to_string_pretty(state).map_err(|e| StorageFailure::Write {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|source| StorageFailure::Write {
                path: self.path.clone(),
                source,
            })
    }
}
