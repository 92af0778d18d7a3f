//! The category catalog: which words select which category, and where each
//! category's data lives.
//!
//! Built once at startup from [`AppConfig`] and shared read-only.

use std::collections::{BTreeMap, HashMap};

use lifeline_core::Category;

use crate::{AppConfig, ConfigError};

/// Immutable alias table and endpoint map.
#[derive(Debug, Clone)]
pub struct Catalog {
    aliases: HashMap<String, Category>,
    endpoints: BTreeMap<Category, String>,
}

impl Catalog {
    /// Build the catalog, resolving relative endpoints against `feed.base_url`.
    ///
    /// Fails when an alias is not a single lowercase word, when one alias
    /// selects two categories, or when a category has no endpoint.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        if config.categories.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one category must be configured".into(),
            ));
        }

        let mut aliases = HashMap::new();
        let mut endpoints = BTreeMap::new();

        for (&category, entry) in &config.categories {
            let endpoint = entry.endpoint.trim();
            if endpoint.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "category '{category}' has no endpoint"
                )));
            }
            if entry.aliases.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "category '{category}' has no aliases"
                )));
            }

            for alias in &entry.aliases {
                if alias.is_empty()
                    || alias.chars().any(char::is_whitespace)
                    || alias.to_lowercase() != *alias
                {
                    return Err(ConfigError::ValidationError(format!(
                        "alias '{alias}' for '{category}' must be a single lowercase word"
                    )));
                }
                if let Some(existing) = aliases.insert(alias.clone(), category) {
                    if existing != category {
                        return Err(ConfigError::ValidationError(format!(
                            "alias '{alias}' maps to both '{existing}' and '{category}'"
                        )));
                    }
                }
            }

            endpoints.insert(category, resolve_endpoint(&config.feed.base_url, endpoint));
        }

        Ok(Self { aliases, endpoints })
    }

    /// The category an exact (lowercase) token selects.
    pub fn lookup(&self, token: &str) -> Option<Category> {
        self.aliases.get(token).copied()
    }

    pub fn is_alias(&self, token: &str) -> bool {
        self.aliases.contains_key(token)
    }

    /// The absolute URL of a category's snapshot.
    pub fn endpoint(&self, category: Category) -> Option<&str> {
        self.endpoints.get(&category).map(String::as_str)
    }

    /// Configured categories in display order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.endpoints.keys().copied()
    }

    /// Aliases of one category, sorted.
    pub fn aliases_for(&self, category: Category) -> Vec<&str> {
        let mut words: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(alias, _)| alias.as_str())
            .collect();
        words.sort_unstable();
        words
    }
}

fn resolve_endpoint(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}
