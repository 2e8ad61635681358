//! Display-field derivation for a single media record.
//!
//! Every function here is total: a record missing any field still yields a
//! usable value (an omitted line, an empty list, or "Unknown").

use reqwest::Url;

use crate::domain::{Description, Link, MediaKind, MediaRecord, PosterRef};

/// Title used when a record has nothing to show
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Overview length (in characters) before it is cut for the card face
pub const SHORT_OVERVIEW_CHARS: usize = 200;

/// Number of genre badges shown per card
pub const MAX_GENRES: usize = 3;

const TICKS_PER_SECOND: u64 = 10_000_000;

/// Base URL and token needed to build artwork references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEndpoint {
    base_url: String,
    api_key: String,
}

impl ImageEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
        }
    }

    /// URL of an item's primary image
    ///
    /// The id is percent-encoded as a path segment and the token as a query
    /// value. A base URL that does not parse is used as plain text.
    pub fn primary_image_url(&self, item_id: &str) -> String {
        let Ok(mut url) = Url::parse(&self.base_url) else {
            return format!(
                "{}/Items/{}/Images/Primary?api_key={}",
                self.base_url, item_id, self.api_key
            );
        };

        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["Items", item_id, "Images", "Primary"]);
        }
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        url.to_string()
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Card title.
///
/// Episodes compose `series - SxxEyy - name`, dropping whatever is absent.
/// Other kinds use the plain name.
pub fn derive_title(record: &MediaRecord) -> String {
    if record.kind() != Some(MediaKind::Episode) {
        return present(&record.name).unwrap_or(UNKNOWN_TITLE).to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    if let Some(series) = present(&record.series_name) {
        parts.push(series.to_string());
    }

    match (record.season_number, record.episode_index) {
        (Some(season), Some(episode)) => parts.push(format!("S{:02}E{:02}", season, episode)),
        (Some(season), None) => parts.push(format!("Season {}", season)),
        (None, Some(episode)) => parts.push(format!("Episode {}", episode)),
        (None, None) => {}
    }

    if let Some(name) = present(&record.name) {
        if !parts.iter().any(|p| p.as_str() == name) {
            parts.push(name.to_string());
        }
    }

    if parts.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        parts.join(" - ")
    }
}

/// Artwork reference. Episodes borrow their series' poster when they know it.
pub fn derive_poster_ref(record: &MediaRecord, images: &ImageEndpoint) -> PosterRef {
    let series_id = match record.kind() {
        Some(MediaKind::Episode) => present(&record.series_id),
        _ => None,
    };

    let (item_id, from_series) = match series_id {
        Some(id) => (id.to_string(), true),
        None => (record.id.clone(), false),
    };

    PosterRef {
        url: images.primary_image_url(&item_id),
        item_id,
        from_series,
    }
}

/// "Year: 2020 | Season: 1"; `None` when there is nothing to say
pub fn derive_year_season(record: &MediaRecord) -> Option<String> {
    let mut details = Vec::new();

    if let Some(year) = record.production_year {
        details.push(format!("Year: {}", year));
    }

    let shows_season = record.kind().map(|k| k.has_seasons()).unwrap_or(false);
    if shows_season {
        if let Some(season) = record.season_number {
            details.push(format!("Season: {}", season));
        }
    }

    if details.is_empty() {
        None
    } else {
        Some(details.join(" | "))
    }
}

/// "1h 32m" or "45m". Zero or absent ticks render nothing.
pub fn derive_runtime(record: &MediaRecord) -> Option<String> {
    let ticks = record.runtime_ticks.filter(|t| *t > 0)?;

    let total_minutes = ticks / TICKS_PER_SECOND / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        Some(format!("{}h {}m", hours, minutes))
    } else {
        Some(format!("{}m", minutes))
    }
}

/// External links from provider ids: IMDb first, then TMDb
pub fn derive_links(record: &MediaRecord) -> Vec<Link> {
    let mut links = Vec::new();

    if let Some(imdb) = record.provider_id("Imdb") {
        links.push(Link::new("IMDb", format!("https://www.imdb.com/title/{}/", imdb)));
    }

    if let Some(tmdb) = record.provider_id("Tmdb") {
        let section = match record.kind() {
            Some(MediaKind::Movie) => "movie",
            _ => "tv",
        };
        links.push(Link::new(
            "TMDb",
            format!("https://www.themoviedb.org/{}/{}", section, tmdb),
        ));
    }

    links
}

/// Overview with a short form for the card face, or the no-description
/// notice with provider links. Never both.
pub fn derive_description(record: &MediaRecord) -> Description {
    match present(&record.overview) {
        Some(full) => {
            let (short, truncated) = truncate_chars(full, SHORT_OVERVIEW_CHARS);
            Description::Overview {
                short,
                full: full.to_string(),
                truncated,
            }
        }
        None => Description::Missing {
            links: derive_links(record),
        },
    }
}

/// First three genres, source order kept. Blank entries among them are
/// not shown, and later genres do not move up to replace them.
pub fn derive_genres(record: &MediaRecord) -> Vec<String> {
    record
        .genres
        .iter()
        .take(MAX_GENRES)
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rating to one decimal.
///
/// A rating of exactly 0 is treated as absent, the same as the source's own
/// display. Records with a genuine 0.0 rating therefore show no rating.
pub fn derive_rating(record: &MediaRecord) -> Option<String> {
    record
        .community_rating
        .filter(|r| r.is_finite() && *r != 0.0)
        .map(|r| format!("{:.1}", r))
}

pub fn derive_season_name(record: &MediaRecord) -> Option<String> {
    present(&record.season_name).map(str::to_string)
}

/// Cut `text` to `max` characters, appending "..." when something was cut
fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => (format!("{}...", text[..byte_idx].trim_end()), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(series: Option<&str>, season: Option<u32>, ep: Option<u32>, name: Option<&str>) -> MediaRecord {
        MediaRecord {
            id: "e1".to_string(),
            item_type: Some("Episode".to_string()),
            name: name.map(str::to_string),
            series_name: series.map(str::to_string),
            season_number: season,
            episode_index: ep,
            ..Default::default()
        }
    }

    #[test]
    fn test_episode_title_table() {
        let cases = [
            (episode(Some("Foo"), Some(1), Some(2), Some("Pilot")), "Foo - S01E02 - Pilot"),
            (episode(None, Some(1), None, Some("X")), "Season 1 - X"),
            (episode(None, None, None, Some("X")), "X"),
            (episode(None, None, Some(7), Some("X")), "Episode 7 - X"),
            (episode(Some("Foo"), Some(12), Some(104), None), "Foo - S12E104"),
            (episode(None, None, None, None), "Unknown"),
        ];

        for (record, expected) in cases {
            assert_eq!(derive_title(&record), expected);
        }
    }

    #[test]
    fn test_episode_name_equal_to_series_is_not_repeated() {
        let record = episode(Some("Foo"), None, None, Some("Foo"));
        assert_eq!(derive_title(&record), "Foo");
    }

    #[test]
    fn test_movie_title_ignores_episode_fields() {
        let mut movie = MediaRecord::new("m", MediaKind::Movie, "Heat");
        movie.season_number = Some(3);
        movie.series_name = Some("Ignored".to_string());
        assert_eq!(derive_title(&movie), "Heat");

        movie.name = None;
        assert_eq!(derive_title(&movie), "Unknown");
    }

    #[test]
    fn test_runtime_formatting() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");

        record.runtime_ticks = Some(5_400_000_000);
        assert_eq!(derive_runtime(&record).as_deref(), Some("9m"));

        record.runtime_ticks = Some(36_030_000_000);
        assert_eq!(derive_runtime(&record).as_deref(), Some("1h 0m"));

        // 1h 59m 59s truncates, never rounds up
        record.runtime_ticks = Some(7_199 * 10_000_000);
        assert_eq!(derive_runtime(&record).as_deref(), Some("1h 59m"));

        record.runtime_ticks = Some(0);
        assert_eq!(derive_runtime(&record), None);

        record.runtime_ticks = None;
        assert_eq!(derive_runtime(&record), None);
    }

    #[test]
    fn test_episode_poster_uses_series() {
        let images = ImageEndpoint::new("https://jf.local/", "KEY");
        let mut record = episode(Some("Foo"), Some(1), Some(1), Some("Pilot"));
        record.series_id = Some("S1".to_string());

        let poster = derive_poster_ref(&record, &images);
        assert_eq!(poster.item_id, "S1");
        assert!(poster.from_series);
        assert_eq!(poster.url, "https://jf.local/Items/S1/Images/Primary?api_key=KEY");
    }

    #[test]
    fn test_poster_url_is_encoded() {
        let images = ImageEndpoint::new("https://jf.local/jellyfin/", "k&y=1");

        assert_eq!(
            images.primary_image_url("a b/c"),
            "https://jf.local/jellyfin/Items/a%20b%2Fc/Images/Primary?api_key=k%26y%3D1"
        );
    }

    #[test]
    fn test_poster_falls_back_to_own_id() {
        let images = ImageEndpoint::new("https://jf.local", "KEY");

        let orphan = episode(None, None, None, Some("X"));
        assert_eq!(derive_poster_ref(&orphan, &images).item_id, "e1");

        // Only episodes borrow a series poster
        let mut series = MediaRecord::new("s9", MediaKind::Series, "Show");
        series.series_id = Some("other".to_string());
        let poster = derive_poster_ref(&series, &images);
        assert_eq!(poster.item_id, "s9");
        assert!(!poster.from_series);
    }

    #[test]
    fn test_year_season_line() {
        let mut movie = MediaRecord::new("m", MediaKind::Movie, "Heat");
        movie.production_year = Some(1995);
        movie.season_number = Some(2);
        assert_eq!(derive_year_season(&movie).as_deref(), Some("Year: 1995"));

        let mut ep = episode(None, Some(0), Some(1), Some("Special"));
        ep.production_year = Some(2020);
        assert_eq!(
            derive_year_season(&ep).as_deref(),
            Some("Year: 2020 | Season: 0")
        );

        let bare = MediaRecord::new("m", MediaKind::Movie, "Heat");
        assert_eq!(derive_year_season(&bare), None);
    }

    #[test]
    fn test_genres_first_three_in_order() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");
        record.genres = vec![
            "Crime".to_string(),
            "Drama".to_string(),
            "Thriller".to_string(),
            "Action".to_string(),
        ];

        assert_eq!(derive_genres(&record), vec!["Crime", "Drama", "Thriller"]);

        record.genres = vec!["Drama".to_string()];
        assert_eq!(derive_genres(&record), vec!["Drama"]);

        // The cut happens before blanks are dropped
        record.genres = vec![
            " ".to_string(),
            "Crime".to_string(),
            "Drama".to_string(),
            "Action".to_string(),
        ];
        assert_eq!(derive_genres(&record), vec!["Crime", "Drama"]);
    }

    #[test]
    fn test_zero_rating_is_absent() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");

        record.community_rating = Some(8.26);
        assert_eq!(derive_rating(&record).as_deref(), Some("8.3"));

        record.community_rating = Some(0.0);
        assert_eq!(derive_rating(&record), None);

        record.community_rating = None;
        assert_eq!(derive_rating(&record), None);
    }

    #[test]
    fn test_long_overview_is_truncated() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");
        let full = "é".repeat(250);
        record.overview = Some(full.clone());

        match derive_description(&record) {
            Description::Overview { short, full: kept, truncated } => {
                assert!(truncated);
                assert_eq!(short.chars().count(), SHORT_OVERVIEW_CHARS + 3);
                assert!(short.ends_with("..."));
                assert_eq!(kept, full);
            }
            other => panic!("expected overview, got {:?}", other),
        }
    }

    #[test]
    fn test_short_overview_is_untouched() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");
        record.overview = Some("A heist.".to_string());
        record.provider_ids.insert("Imdb".to_string(), "tt0113277".to_string());

        assert_eq!(
            derive_description(&record),
            Description::Overview {
                short: "A heist.".to_string(),
                full: "A heist.".to_string(),
                truncated: false,
            }
        );
    }

    #[test]
    fn test_missing_overview_yields_links() {
        let mut record = MediaRecord::new("m", MediaKind::Movie, "Heat");
        record.overview = Some("   ".to_string());
        record.provider_ids.insert("Tmdb".to_string(), "949".to_string());
        record.provider_ids.insert("Imdb".to_string(), "tt0113277".to_string());

        match derive_description(&record) {
            Description::Missing { links } => {
                assert_eq!(links.len(), 2);
                assert_eq!(links[0].label, "IMDb");
                assert_eq!(links[0].url, "https://www.imdb.com/title/tt0113277/");
                assert_eq!(links[1].url, "https://www.themoviedb.org/movie/949");
            }
            other => panic!("expected missing description, got {:?}", other),
        }
    }

    #[test]
    fn test_series_tmdb_link_uses_tv_path() {
        let mut series = MediaRecord::new("s", MediaKind::Series, "Show");
        series.provider_ids.insert("Tmdb".to_string(), "1396".to_string());
        assert_eq!(
            derive_links(&series),
            vec![Link::new("TMDb", "https://www.themoviedb.org/tv/1396")]
        );
    }
}
