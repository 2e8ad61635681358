//! Snapshot to document transformation.
//!
//! Records are split into Movies, Series and Episodes, keeping source order
//! inside each group. All three sections are always present, even when
//! empty. Records of any other kind are dropped.

use tracing::debug;

use crate::config::ResolvedConfig;
use crate::domain::{CatalogSnapshot, Card, MediaKind, MediaRecord, RenderedDocument, Section};

use super::normalizer::{
    derive_description, derive_genres, derive_poster_ref, derive_rating, derive_runtime,
    derive_season_name, derive_title, derive_year_season, ImageEndpoint,
};

/// Builds [`RenderedDocument`]s from snapshots
#[derive(Debug, Clone)]
pub struct Renderer {
    images: ImageEndpoint,
    title: String,
    refresh_seconds: u64,
}

impl Renderer {
    pub fn new(images: ImageEndpoint, title: impl Into<String>, refresh_seconds: u64) -> Self {
        Self {
            images,
            title: title.into(),
            refresh_seconds,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            ImageEndpoint::new(&config.server.url, &config.server.api_key),
            &config.output.title,
            config.output.refresh_seconds,
        )
    }

    /// Render a snapshot. Pure: the same snapshot always renders the same.
    pub fn render(&self, snapshot: &CatalogSnapshot) -> RenderedDocument {
        let mut sections: Vec<Section> = MediaKind::ALL
            .iter()
            .map(|kind| Section {
                kind: *kind,
                heading: kind.heading().to_string(),
                cards: Vec::new(),
            })
            .collect();

        for record in snapshot.records() {
            let Some(kind) = record.kind() else {
                debug!(id = %record.id, item_type = ?record.item_type, "Dropping record of unrendered kind");
                continue;
            };

            if let Some(section) = sections.iter_mut().find(|s| s.kind == kind) {
                section.cards.push(self.card(&record));
            }
        }

        RenderedDocument {
            title: self.title.clone(),
            refresh_seconds: self.refresh_seconds,
            sections,
        }
    }

    /// Card for one record
    pub fn card(&self, record: &MediaRecord) -> Card {
        Card {
            id: record.id.clone(),
            title: derive_title(record),
            poster: derive_poster_ref(record, &self.images),
            season_name: derive_season_name(record),
            details: derive_year_season(record),
            runtime: derive_runtime(record),
            rating: derive_rating(record),
            genres: derive_genres(record),
            description: derive_description(record),
        }
    }
}
