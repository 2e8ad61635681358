//! Domain types for shelfwatch.
//!
//! This module contains the core data structures:
//! - Record: one media item from the catalog source
//! - Snapshot: one fetched batch, in source order
//! - Document: the categorized, rendered view of a snapshot

pub mod document;
pub mod record;
pub mod snapshot;

// Re-export commonly used types
pub use document::{Card, Description, Link, PosterRef, RenderedDocument, Section};
pub use record::{MalformedRecord, MediaKind, MediaRecord};
pub use snapshot::CatalogSnapshot;
