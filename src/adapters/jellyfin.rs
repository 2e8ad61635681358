//! Jellyfin catalog adapter.
//!
//! Issues one read-only `GET /Users/{user}/Items` per fetch, sorted by
//! creation date, newest first.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{CatalogSource, FetchFailure};
use crate::config::{ServerSettings, MAX_LIMIT};
use crate::domain::CatalogSnapshot;

/// Header carrying the static API token
pub const TOKEN_HEADER: &str = "X-Emby-Token";

/// Item kinds requested from the server
pub const INCLUDE_ITEM_TYPES: &str = "Movie,Series,Episode";

/// Fields requested in addition to the server defaults
pub const ITEM_FIELDS: &str = "PrimaryImageAspectRatio,SeriesName,SeasonNumber,IndexNumber,\
Genres,ProductionYear,SeasonName,Overview,CommunityRating,RunTimeTicks,ProviderIds";

/// Jellyfin client bound to one user library
pub struct JellyfinSource {
    base_url: String,
    user_id: String,
    api_key: String,
    client: reqwest::Client,
}

impl JellyfinSource {
    /// Create a source from server settings
    pub fn new(settings: &ServerSettings) -> Result<Self, FetchFailure> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shelfwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()
            .map_err(|e| FetchFailure::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            user_id: settings.user_id.clone(),
            api_key: settings.api_key.clone(),
            client,
        })
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn items_url(&self) -> String {
        self.api_url(&format!("/Users/{}/Items", self.user_id))
    }

    /// Query string for a latest-items request
    pub fn query(limit: u32) -> Vec<(&'static str, String)> {
        vec![
            ("SortBy", "DateCreated".to_string()),
            ("SortOrder", "Descending".to_string()),
            ("IncludeItemTypes", INCLUDE_ITEM_TYPES.to_string()),
            ("Limit", limit.clamp(1, MAX_LIMIT).to_string()),
            ("Recursive", "true".to_string()),
            ("Fields", ITEM_FIELDS.to_string()),
        ]
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, FetchFailure> {
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchFailure::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(response)
    }
}

/// Extract the `Items` array from a query response body
pub fn parse_items(body: Value) -> Result<CatalogSnapshot, FetchFailure> {
    match body {
        Value::Object(mut map) => match map.remove("Items") {
            Some(Value::Array(items)) => Ok(CatalogSnapshot::from_raw(items)),
            Some(other) => Err(FetchFailure::Malformed(format!(
                "Items is not an array: {}",
                type_name(&other)
            ))),
            None => Err(FetchFailure::Malformed("response has no Items".to_string())),
        },
        other => Err(FetchFailure::Malformed(format!(
            "expected an object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl CatalogSource for JellyfinSource {
    fn name(&self) -> &str {
        "jellyfin"
    }

    async fn fetch(&self, limit: u32) -> Result<CatalogSnapshot, FetchFailure> {
        let response = self.get(&self.items_url(), &Self::query(limit)).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchFailure::Malformed(e.to_string()))?;

        let snapshot = parse_items(body)?;
        debug!(items = snapshot.len(), "Fetched latest items");
        Ok(snapshot)
    }

    async fn health_check(&self) -> Result<(), FetchFailure> {
        self.get(&self.api_url("/System/Info/Public"), &[]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> ServerSettings {
        ServerSettings {
            url: "https://jf.local:8920/".to_string(),
            user_id: "u1".to_string(),
            api_key: "KEY".to_string(),
            accept_invalid_certs: true,
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_items_url() {
        let source = JellyfinSource::new(&settings()).unwrap();
        assert_eq!(source.items_url(), "https://jf.local:8920/Users/u1/Items");
    }

    #[test]
    fn test_query_clamps_limit() {
        let limit = |n| {
            JellyfinSource::query(n)
                .into_iter()
                .find(|(k, _)| *k == "Limit")
                .map(|(_, v)| v)
                .unwrap()
        };

        assert_eq!(limit(50), "50");
        assert_eq!(limit(0), "1");
        assert_eq!(limit(MAX_LIMIT + 1), MAX_LIMIT.to_string());
    }

    #[test]
    fn test_parse_items() {
        let snapshot = parse_items(json!({ "Items": [{ "Id": "a" }], "TotalRecordCount": 1 })).unwrap();
        assert_eq!(snapshot.len(), 1);

        let empty = parse_items(json!({ "Items": [] })).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_items_rejects_bad_shapes() {
        assert!(matches!(parse_items(json!({})), Err(FetchFailure::Malformed(_))));
        assert!(matches!(parse_items(json!({ "Items": {} })), Err(FetchFailure::Malformed(_))));
        assert!(matches!(parse_items(json!([1, 2])), Err(FetchFailure::Malformed(_))));
    }
}
