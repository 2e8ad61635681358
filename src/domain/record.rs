//! Media records as returned by the catalog source.
//!
//! Field names follow the Jellyfin item DTO (PascalCase). Every attribute
//! except `Id` is optional; a record that cannot be read at all is reported
//! as [`MalformedRecord`] and skipped by the renderer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Media category of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Movie,
    Series,
    Episode,
}

impl MediaKind {
    /// All kinds, in the order sections appear in a rendered document
    pub const ALL: [MediaKind; 3] = [MediaKind::Movie, MediaKind::Series, MediaKind::Episode];

    /// Parse the source's `Type` string. Anything else is not a kind we render.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Movie" => Some(Self::Movie),
            "Series" => Some(Self::Series),
            "Episode" => Some(Self::Episode),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "Movie",
            Self::Series => "Series",
            Self::Episode => "Episode",
        }
    }

    /// Section heading used in rendered documents
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Movie => "Movies",
            Self::Series => "Series",
            Self::Episode => "Episodes",
        }
    }

    /// Whether a season number means anything for this kind
    pub fn has_seasons(&self) -> bool {
        matches!(self, Self::Series | Self::Episode)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item from the catalog source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaRecord {
    /// Opaque item id, stable across polls
    pub id: String,

    /// Raw `Type` value (see [`MediaRecord::kind`])
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub series_name: Option<String>,

    #[serde(default)]
    pub series_id: Option<String>,

    #[serde(default)]
    pub season_number: Option<u32>,

    /// Episode number within its season
    #[serde(rename = "IndexNumber", default)]
    pub episode_index: Option<u32>,

    #[serde(default)]
    pub season_name: Option<String>,

    #[serde(default)]
    pub production_year: Option<i32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,

    #[serde(default)]
    pub overview: Option<String>,

    /// Nominally 0-10
    #[serde(default)]
    pub community_rating: Option<f64>,

    /// Duration in 100ns units
    #[serde(rename = "RunTimeTicks", default)]
    pub runtime_ticks: Option<u64>,

    /// External cross references, e.g. "Imdb" -> "tt0000001"
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider_ids: BTreeMap<String, String>,
}

/// A raw record that could not be read as a [`MediaRecord`]
#[derive(Debug, Error)]
pub enum MalformedRecord {
    #[error("record has no Id")]
    MissingId,

    #[error("record does not match the item schema: {0}")]
    Schema(#[from] serde_json::Error),
}

impl MediaRecord {
    /// Create a record with just an id, kind and name
    pub fn new(id: impl Into<String>, kind: MediaKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            item_type: Some(kind.as_str().to_string()),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Read a record from the raw JSON the source returned
    pub fn from_value(value: &serde_json::Value) -> Result<Self, MalformedRecord> {
        let record: MediaRecord = serde_json::from_value(value.clone())?;
        if record.id.trim().is_empty() {
            return Err(MalformedRecord::MissingId);
        }
        Ok(record)
    }

    /// Parsed media kind, `None` for types outside Movie/Series/Episode
    pub fn kind(&self) -> Option<MediaKind> {
        self.item_type.as_deref().and_then(MediaKind::parse)
    }

    /// Look up a provider id by name, ignoring case ("Imdb", "IMDB", ...)
    pub fn provider_id(&self, provider: &str) -> Option<&str> {
        self.provider_ids
            .iter()
            .find(|(name, id)| name.eq_ignore_ascii_case(provider) && !id.trim().is_empty())
            .map(|(_, id)| id.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jellyfin_item() {
        let raw = json!({
            "Id": "abc",
            "Type": "Episode",
            "Name": "Pilot",
            "SeriesName": "Foo",
            "SeriesId": "S1",
            "SeasonNumber": 1,
            "IndexNumber": 2,
            "Genres": ["Drama"],
            "CommunityRating": 7.9,
            "RunTimeTicks": 27000000000u64,
            "ProviderIds": { "Imdb": "tt123" }
        });

        let record = MediaRecord::from_value(&raw).unwrap();
        assert_eq!(record.id, "abc");
        assert_eq!(record.kind(), Some(MediaKind::Episode));
        assert_eq!(record.series_id.as_deref(), Some("S1"));
        assert_eq!(record.season_number, Some(1));
        assert_eq!(record.episode_index, Some(2));
        assert_eq!(record.provider_id("imdb"), Some("tt123"));
    }

    #[test]
    fn test_null_collections_become_empty() {
        let raw = json!({ "Id": "x", "Type": "Movie", "Genres": null, "ProviderIds": null });
        let record = MediaRecord::from_value(&raw).unwrap();
        assert!(record.genres.is_empty());
        assert!(record.provider_ids.is_empty());
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let raw = json!({ "Type": "Movie", "Name": "No id" });
        assert!(matches!(
            MediaRecord::from_value(&raw),
            Err(MalformedRecord::Schema(_))
        ));

        let blank = json!({ "Id": "  ", "Type": "Movie" });
        assert!(matches!(
            MediaRecord::from_value(&blank),
            Err(MalformedRecord::MissingId)
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let raw = json!({ "Id": "x", "Type": "MusicAlbum" });
        let record = MediaRecord::from_value(&raw).unwrap();
        assert_eq!(record.kind(), None);
    }
}
