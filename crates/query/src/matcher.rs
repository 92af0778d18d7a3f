//! District matching, filtering and ranking of feed records.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use lifeline_config::{Catalog, QueryConfig};
use lifeline_core::Record;

/// Finds the records a query asks for.
///
/// A query token names a district when it is long enough, is not a filler
/// word, is not a category alias, and occurs inside the district name.
/// Districts are compared lowercase.
pub struct DistrictMatcher {
    catalog: Arc<Catalog>,
    min_token_len: usize,
    ignored: HashSet<String>,
}

impl DistrictMatcher {
    pub fn new(catalog: Arc<Catalog>, settings: &QueryConfig) -> Self {
        Self {
            catalog,
            min_token_len: settings.min_district_token_len,
            ignored: settings
                .ignored_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
        }
    }

    /// Match, filter and rank in one step.
    pub fn find(&self, tokens: &[String], records: Vec<Record>) -> Vec<Record> {
        let districts = self.matched_districts(tokens, &records);
        if districts.is_empty() {
            return Vec::new();
        }
        select(records, &districts)
    }

    /// Lowercased districts, drawn from `records`, that some token names.
    pub fn matched_districts(&self, tokens: &[String], records: &[Record]) -> BTreeSet<String> {
        let known: BTreeSet<String> = records
            .iter()
            .filter_map(Record::district)
            .map(str::to_lowercase)
            .collect();

        tokens
            .iter()
            .filter(|token| self.is_place_token(token))
            .flat_map(|token| {
                known
                    .iter()
                    .filter(move |district| district.contains(token.as_str()))
                    .cloned()
            })
            .collect()
    }

    fn is_place_token(&self, token: &str) -> bool {
        token.chars().count() >= self.min_token_len
            && !self.ignored.contains(token)
            && !self.catalog.is_alias(token)
    }
}

/// Keep verified, named records in one of `districts`, most recently
/// verified first. Ties keep feed order.
pub fn select(records: Vec<Record>, districts: &BTreeSet<String>) -> Vec<Record> {
    let mut selected: Vec<Record> = records
        .into_iter()
        .filter(|record| {
            record
                .district()
                .is_some_and(|d| districts.contains(&d.to_lowercase()))
        })
        .filter(Record::is_verified)
        .filter(|record| record.name().is_some())
        .collect();

    // `sort_by` is stable.
    selected.sort_by(|a, b| b.last_verified_on().cmp(&a.last_verified_on()));
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeline_config::AppConfig;
    use serde_json::json;

    fn matcher() -> DistrictMatcher {
        let config = AppConfig::default();
        let catalog = Arc::new(Catalog::from_config(&config).unwrap());
        DistrictMatcher::new(catalog, &config.query)
    }

    fn record(name: &str, district: &str, status: &str, verified_on: i64) -> Record {
        Record::from_value(json!({
            "name": name,
            "district": district,
            "verificationStatus": status,
            "lastVerifiedOn": verified_on,
        }))
        .unwrap()
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn names(records: &[Record]) -> Vec<&str> {
        records.iter().filter_map(Record::name).collect()
    }

    #[test]
    fn newest_verified_first() {
        let records = vec![
            record("A", "Mumbai", "Verified", 100),
            record("B", "Mumbai", "Verified", 200),
            record("C", "Pune", "Verified", 300),
        ];
        let found = matcher().find(&tokens(&["oxygen", "in", "mumbai"]), records);
        assert_eq!(names(&found), vec!["B", "A"]);
    }

    #[test]
    fn unknown_district_matches_nothing() {
        let records = vec![record("A", "Mumbai", "Verified", 100)];
        assert!(matcher().find(&tokens(&["oxygen", "atlantis"]), records).is_empty());
    }

    #[test]
    fn unverified_and_nameless_records_are_dropped() {
        let mut records = vec![
            record("A", "Mumbai", "Unverified", 100),
            record("B", "Mumbai", "Not Verified", 100),
            record("C", "Mumbai", "verified", 50),
        ];
        records.push(
            Record::from_value(json!({
                "district": "Mumbai",
                "verificationStatus": "Verified",
            }))
            .unwrap(),
        );
        let found = matcher().find(&tokens(&["oxygen", "mumbai"]), records);
        assert_eq!(names(&found), vec!["C"]);
    }

    #[test]
    fn token_matches_inside_district_names() {
        let records = vec![
            record("A", "Mumbai", "Verified", 1),
            record("B", "Mumbai Suburban", "Verified", 2),
            record("C", "Thane", "Verified", 3),
        ];
        let m = matcher();
        let districts = m.matched_districts(&tokens(&["beds", "mumbai"]), &records);
        assert_eq!(
            districts.into_iter().collect::<Vec<_>>(),
            vec!["mumbai".to_string(), "mumbai suburban".to_string()]
        );
    }

    #[test]
    fn short_filler_and_alias_tokens_never_match() {
        let records = vec![
            record("A", "Oxygen Nagar", "Verified", 1),
            record("B", "Indore", "Verified", 2),
            record("C", "Anantapur", "Verified", 3),
        ];
        let m = matcher();
        // "in" is too short and ignored; "oxygen" is an alias; "any" is filler.
        assert!(
            m.matched_districts(&tokens(&["oxygen", "in", "any"]), &records)
                .is_empty()
        );
    }

    #[test]
    fn unknown_freshness_sorts_last_and_ties_keep_order() {
        let mut records = vec![
            Record::from_value(json!({
                "name": "Undated",
                "district": "Pune",
                "verificationStatus": "Verified",
            }))
            .unwrap(),
        ];
        records.push(record("First", "Pune", "Verified", 10));
        records.push(record("Second", "Pune", "Verified", 10));
        records.push(record("Newest", "Pune", "Verified", 20));

        let found = matcher().find(&tokens(&["oxygen", "pune"]), records);
        assert_eq!(names(&found), vec!["Newest", "First", "Second", "Undated"]);
    }

    #[test]
    fn district_case_is_ignored() {
        let records = vec![record("A", "NEW DELHI", "Verified", 1)];
        let found = matcher().find(&tokens(&["o2", "delhi"]), records);
        assert_eq!(names(&found), vec!["A"]);
    }
}
