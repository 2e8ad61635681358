//! shelfwatch - snapshot page of recently added media
//!
//! Periodically asks a Jellyfin server for its most recently added items
//! and, only when that list changed, regenerates a categorized page of
//! movies, series and episodes.
//!
//! # Architecture
//!
//! Each poll is a one-way pipeline:
//! - Fetch the latest items (the only network call)
//! - Fingerprint the raw records (key-order independent, record-order dependent)
//! - Compare with the last rendered fingerprint
//! - On change: render, write the artifact, then save the fingerprint
//!
//! # Modules
//!
//! - `adapters`: Catalog source seam and the Jellyfin client
//! - `core`: Normalizer, Fingerprint, ChangeStore, Renderer, PollLoop
//! - `domain`: Data structures (MediaRecord, CatalogSnapshot, RenderedDocument)
//! - `output`: HTML and JSON serialization of rendered documents
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Poll every two minutes
//! shelfwatch watch
//!
//! # One cycle, then exit
//! shelfwatch watch --once
//!
//! # Force a render to stdout as JSON
//! shelfwatch render --stdout --format json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod output;

// Re-export main types at crate root for convenience
pub use adapters::{CatalogSource, FetchFailure, JellyfinSource};
pub use config::ResolvedConfig;
pub use core::{CycleOutcome, Fingerprint, PollLoop, Renderer};
pub use domain::{CatalogSnapshot, MediaKind, MediaRecord, RenderedDocument};
