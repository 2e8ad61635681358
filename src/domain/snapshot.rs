//! One fetched batch of catalog records.

use serde_json::Value;
use tracing::warn;

use super::record::MediaRecord;

/// Records in source order (newest first), exactly as the source returned them.
///
/// The raw JSON is kept because the fingerprint is computed over the raw
/// fields, not over what this crate happens to understand of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    items: Vec<Value>,
}

impl CatalogSnapshot {
    pub fn from_raw(items: Vec<Value>) -> Self {
        Self { items }
    }

    /// Build a snapshot from typed records (used by stub sources and tests)
    pub fn from_records(records: &[MediaRecord]) -> Self {
        let items = records
            .iter()
            .filter_map(|record| serde_json::to_value(record).ok())
            .collect();
        Self { items }
    }

    pub fn raw(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Typed view of the snapshot, in source order.
    ///
    /// Records that cannot be read are logged and left out.
    pub fn records(&self) -> Vec<MediaRecord> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(position, raw)| match MediaRecord::from_value(raw) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(position, "Skipping malformed record: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaKind;
    use serde_json::json;

    #[test]
    fn test_records_skip_malformed_and_keep_order() {
        let snapshot = CatalogSnapshot::from_raw(vec![
            json!({ "Id": "b", "Type": "Movie", "Name": "Second" }),
            json!({ "Name": "no id" }),
            json!({ "Id": "a", "Type": "Series", "Name": "First" }),
        ]);

        let records = snapshot.records();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "b");
        assert_eq!(records[1].id, "a");
    }

    #[test]
    fn test_from_records_round_trips_through_raw() {
        let movie = MediaRecord::new("m1", MediaKind::Movie, "Heat");
        let snapshot = CatalogSnapshot::from_records(&[movie.clone()]);

        assert_eq!(snapshot.raw()[0]["Id"], "m1");
        assert_eq!(snapshot.records(), vec![movie]);
    }
}
