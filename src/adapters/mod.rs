//! Adapter interfaces for external systems.
//!
//! The catalog source is the only network-facing seam. Everything behind
//! it (HTTP, TLS, auth headers) stays inside the adapter.

pub mod jellyfin;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::CatalogSnapshot;

// Re-export the Jellyfin adapter
pub use jellyfin::JellyfinSource;

/// Why a fetch produced no snapshot.
///
/// A failure is never the same as an empty library.
#[derive(Debug, Clone, Error)]
pub enum FetchFailure {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Source of recently added catalog items
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch up to `limit` items, newest first
    async fn fetch(&self, limit: u32) -> Result<CatalogSnapshot, FetchFailure>;

    /// Check that the source is reachable
    async fn health_check(&self) -> Result<(), FetchFailure>;
}
