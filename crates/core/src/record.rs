//! Feed records: one resource entry returned by the data feed.
//!
//! A record has a handful of fields the pipeline reasons about (name,
//! district, verification status, last verification time) and an
//! open-ended set of category-specific descriptive fields. The full
//! field map is kept in its original order so replies list fields the
//! way the feed publishes them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NAME: &str = "name";
pub const DISTRICT: &str = "district";
pub const VERIFICATION_STATUS: &str = "verificationStatus";
pub const LAST_VERIFIED_ON: &str = "lastVerifiedOn";

/// One resource entry from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    name: Option<String>,
    district: Option<String>,
    verification_status: Option<String>,
    last_verified_on: Freshness,
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a JSON value. Returns `None` for non-objects.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::from(map)),
            _ => None,
        }
    }

    /// The record's display name, if present and non-blank.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn last_verified_on(&self) -> Freshness {
        self.last_verified_on
    }

    /// All fields in feed order, including the ones with typed accessors.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether the verification status carries the "verified" marker.
    ///
    /// Matching is case-insensitive; "unverified" and "not verified" do not
    /// count.
    pub fn is_verified(&self) -> bool {
        let Some(status) = self.verification_status.as_deref() else {
            return false;
        };
        let status = status.to_lowercase();
        status.contains("verified")
            && !status.contains("unverified")
            && !status.contains("not verified")
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            name: text(NAME),
            district: text(DISTRICT),
            verification_status: text(VERIFICATION_STATUS),
            last_verified_on: fields
                .get(LAST_VERIFIED_ON)
                .map(Freshness::from_value)
                .unwrap_or_default(),
            fields,
        }
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

/// Sort key for "most recently verified first".
///
/// Holds milliseconds since the epoch when the timestamp is a date, or the
/// raw value when the feed publishes a plain number. Unknown timestamps
/// compare lower than every known one, so they sink to the end of a
/// descending sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Freshness(Option<i64>);

impl Freshness {
    pub const UNKNOWN: Freshness = Freshness(None);

    pub fn new(value: i64) -> Self {
        Self(Some(value))
    }

    /// Parse a `lastVerifiedOn` value.
    ///
    /// Accepts JSON numbers, integer strings, RFC 3339 timestamps and
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (UTC).
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) => Self(n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))),
            Value::String(s) => Self::parse(s),
            _ => Self::UNKNOWN,
        }
    }

    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::UNKNOWN;
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Self(Some(n));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Self(Some(dt.timestamp_millis()));
        }
        for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Self(Some(dt.and_utc().timestamp_millis()));
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(Some(dt.and_utc().timestamp_millis())))
            .unwrap_or(Self::UNKNOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn typed_fields_are_extracted() {
        let r = record(json!({
            "name": "City Oxygen Supply\n",
            "district": "Mumbai",
            "verificationStatus": "Verified",
            "lastVerifiedOn": 200,
            "phone1": "9876543210"
        }));
        assert_eq!(r.name(), Some("City Oxygen Supply"));
        assert_eq!(r.district(), Some("Mumbai"));
        assert!(r.is_verified());
        assert_eq!(r.last_verified_on(), Freshness::new(200));
        assert_eq!(r.fields().len(), 5);
    }

    #[test]
    fn blank_name_is_absent() {
        let r = record(json!({"name": "   ", "district": "Pune"}));
        assert_eq!(r.name(), None);
        let r = record(json!({"district": "Pune"}));
        assert_eq!(r.name(), None);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(Record::from_value(json!([1, 2, 3])).is_none());
        assert!(Record::from_value(json!("oxygen")).is_none());
    }

    #[test]
    fn verification_marker() {
        let status = |s: &str| record(json!({"verificationStatus": s})).is_verified();
        assert!(status("Verified"));
        assert!(status("VERIFIED and available"));
        assert!(!status("Unverified"));
        assert!(!status("Not verified"));
        assert!(!status("Pending"));
        assert!(!record(json!({})).is_verified());
    }

    #[test]
    fn field_order_is_preserved() {
        let r = record(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let keys: Vec<&str> = r.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn serde_roundtrip_keeps_every_field() {
        let original = json!({"name": "A", "district": "Pune", "extra": [1, 2]});
        let r: Record = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&r).unwrap(), original);
    }

    #[test]
    fn freshness_parsing() {
        assert_eq!(Freshness::from_value(&json!(100)), Freshness::new(100));
        assert_eq!(Freshness::from_value(&json!("42")), Freshness::new(42));
        assert_eq!(
            Freshness::from_value(&json!("1970-01-01T00:00:01Z")),
            Freshness::new(1000)
        );
        assert_eq!(
            Freshness::from_value(&json!("1970-01-02")),
            Freshness::new(86_400_000)
        );
        assert_eq!(
            Freshness::from_value(&json!("1970-01-01 00:00:02")),
            Freshness::new(2000)
        );
        assert_eq!(Freshness::from_value(&json!("yesterday")), Freshness::UNKNOWN);
        assert_eq!(Freshness::from_value(&json!(null)), Freshness::UNKNOWN);
    }

    #[test]
    fn unknown_freshness_sorts_below_known() {
        assert!(Freshness::UNKNOWN < Freshness::new(i64::MIN));
    }
}
