//! Core change-detection pipeline.
//!
//! This module contains:
//! - Normalizer: display fields derived from one record
//! - Fingerprint: canonical digest of a snapshot
//! - ChangeStore: last rendered fingerprint
//! - Storage: artifact persistence
//! - Renderer: snapshot to categorized document
//! - Poller: the fetch/compare/render loop

pub mod change_store;
pub mod fingerprint;
pub mod normalizer;
pub mod poller;
pub mod renderer;
pub mod storage;

// Re-export commonly used types
pub use change_store::{ChangeState, ChangeStore, FileChangeStore};
pub use fingerprint::{canonical_bytes, fingerprint, Fingerprint};
pub use normalizer::ImageEndpoint;
pub use poller::{CycleOutcome, LoopSettings, PollLoop};
pub use renderer::Renderer;
pub use storage::{ArtifactSink, FileArtifactSink, StorageFailure};
