//! Remote data feed access for Lifeline.
//!
//! A feed publishes one JSON snapshot per category: `{"data": [ ... ]}`.
//! Every query reads a fresh snapshot; nothing is cached and failed reads
//! are not retried.

pub mod http;

pub use http::HttpFeed;

use async_trait::async_trait;
use lifeline_core::error::FeedError;
use lifeline_core::{Category, Record};

/// A source of category snapshots.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs (e.g., "http").
    fn name(&self) -> &str;

    /// Fetch the full current record set for a category.
    async fn fetch(&self, category: Category) -> Result<Vec<Record>, FeedError>;
}

/// Parse a snapshot body.
///
/// The top-level `data` array is required. Entries that are not JSON
/// objects are skipped.
pub fn parse_snapshot(body: &[u8]) -> Result<Vec<Record>, FeedError> {
    #[derive(serde::Deserialize)]
    struct Snapshot {
        data: Option<Vec<serde_json::Value>>,
    }

    let snapshot: Snapshot = serde_json::from_slice(body)
        .map_err(|e| FeedError::Malformed(format!("invalid JSON: {e}")))?;

    let entries = snapshot
        .data
        .ok_or_else(|| FeedError::Malformed("missing top-level 'data' array".into()))?;

    let total = entries.len();
    let records: Vec<Record> = entries.into_iter().filter_map(Record::from_value).collect();
    if records.len() < total {
        tracing::warn!(
            skipped = total - records.len(),
            "Feed snapshot contained non-object entries"
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_array() {
        let body = br#"{"data": [
            {"name": "A", "district": "Mumbai"},
            {"name": "B", "district": "Pune"}
        ]}"#;
        let records = parse_snapshot(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].district(), Some("Pune"));
    }

    #[test]
    fn missing_data_is_malformed() {
        let err = parse_snapshot(br#"{"records": []}"#).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
        let err = parse_snapshot(br#"{"data": null}"#).unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse_snapshot(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let records = parse_snapshot(br#"{"data": [1, "x", {"name": "A"}]}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), Some("A"));
    }

    #[test]
    fn empty_data_is_valid() {
        assert!(parse_snapshot(br#"{"data": []}"#).unwrap().is_empty());
    }
}
