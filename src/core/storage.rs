//! File persistence for the rendered artifact.
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a reader sees either the previous document or the new one.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Failure to read or write persisted state or the artifact
#[derive(Debug, Error)]
pub enum StorageFailure {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt state file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Destination of the rendered document
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Where the artifact goes, for log lines
    fn describe(&self) -> String;

    /// Replace the artifact with `contents`
    async fn publish(&self, contents: &str) -> Result<(), StorageFailure>;
}

/// Artifact written to a single file on disk
pub struct FileArtifactSink {
    path: PathBuf,
}

impl FileArtifactSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn publish(&self, contents: &str) -> Result<(), StorageFailure> {
        write_atomic(&self.path, contents.as_bytes())
            .await
            .map_err(|source| StorageFailure::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Write `bytes` to `path` through a temp file and rename
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    if let Err(e) = fs::write(&tmp_path, bytes).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    Ok(())
}
