//! Structured output of the renderer.
//!
//! A [`RenderedDocument`] is plain data; turning it into HTML or JSON is the
//! job of [`crate::output`].

use serde::{Deserialize, Serialize};

use super::record::MediaKind;

/// The categorized snapshot of the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Page title
    pub title: String,

    /// How often consumers should reload the document (seconds)
    pub refresh_seconds: u64,

    /// Always Movies, Series, Episodes, in that order
    pub sections: Vec<Section>,
}

impl RenderedDocument {
    /// Section for a kind
    pub fn section(&self, kind: MediaKind) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Total number of cards across all sections
    pub fn card_count(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }
}

/// One group of cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub kind: MediaKind,
    pub heading: String,
    pub cards: Vec<Card>,
}

/// One rendered media record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub poster: PosterRef,
    pub season_name: Option<String>,
    /// "Year: 2020 | Season: 1"
    pub details: Option<String>,
    pub runtime: Option<String>,
    pub rating: Option<String>,
    /// At most three, in source order
    pub genres: Vec<String>,
    pub description: Description,
}

/// Reference to an item's primary artwork
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterRef {
    /// Item whose artwork is used (the series for most episodes)
    pub item_id: String,
    pub from_series: bool,
    pub url: String,
}

/// Either the overview text or a notice with external links
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Description {
    Overview {
        short: String,
        full: String,
        truncated: bool,
    },
    Missing {
        links: Vec<Link>,
    },
}

/// Labelled external link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}
