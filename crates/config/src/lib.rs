//! Configuration loading, validation, and management for Lifeline.
//!
//! Loads configuration from `~/.lifeline/config.toml` with environment
//! variable overrides. Validates all settings at startup and builds the
//! immutable [`Catalog`] the query pipeline resolves categories against.

mod catalog;

pub use catalog::Catalog;

use lifeline_core::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.lifeline/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Telegram transport settings
    #[serde(default)]
    pub telegram: TelegramSettings,

    /// Remote data feed settings
    #[serde(default)]
    pub feed: FeedConfig,

    /// Category endpoints and the words that select them
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<Category, CategoryConfig>,

    /// Query interpretation and pagination
    #[serde(default)]
    pub query: QueryConfig,

    /// Reply rendering
    #[serde(default)]
    pub format: FormatConfig,

    /// Optional error-reporting sink
    #[serde(default)]
    pub reporting: ReportingConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token from @BotFather. Usually supplied via `TELEGRAM_BOT_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    #[serde(default = "default_telegram_api")]
    pub api_url: String,

    /// Long-poll wait passed to `getUpdates`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".into()
}
fn default_poll_timeout() -> u64 {
    30
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            api_url: default_telegram_api(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl std::fmt::Debug for TelegramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSettings")
            .field("bot_token", &redact(&self.bot_token))
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Relative category endpoints are resolved against this URL
    #[serde(default = "default_feed_url")]
    pub base_url: String,

    /// Upper bound for one feed round-trip
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_feed_url() -> String {
    "https://life-api.coronasafe.network/data".into()
}
fn default_feed_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("lifeline/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_url(),
            timeout_secs: default_feed_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Path relative to `feed.base_url`, or an absolute URL
    pub endpoint: String,

    /// Lowercase single-word aliases that select this category
    #[serde(default)]
    pub aliases: Vec<String>,
}

fn default_categories() -> BTreeMap<Category, CategoryConfig> {
    let entry = |endpoint: &str, aliases: &[&str]| CategoryConfig {
        endpoint: endpoint.into(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    };

    BTreeMap::from([
        (Category::Ambulance, entry("ambulance.json", &["ambulance", "ambulances"])),
        (Category::Helpline, entry("helpline.json", &["helpline", "helplines"])),
        (
            Category::Hospital,
            entry("hospital_clinic_centre.json", &["hospital", "hospitals", "bed", "beds"]),
        ),
        (Category::Medicine, entry("medicine.json", &["medicine", "medicines"])),
        (Category::Oxygen, entry("oxygen.json", &["oxygen", "o2"])),
    ])
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Records released per reply
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Messages with fewer words are rejected as invalid input
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Shorter words never take part in district matching
    #[serde(default = "default_min_district_token_len")]
    pub min_district_token_len: usize,

    /// Filler words ignored for district matching
    #[serde(default = "default_ignored_words")]
    pub ignored_words: Vec<String>,
}

fn default_page_size() -> usize {
    3
}
fn default_min_tokens() -> usize {
    2
}
fn default_min_district_token_len() -> usize {
    3
}
fn default_ignored_words() -> Vec<String> {
    ["in", "at", "for", "near", "the", "and", "from", "of", "any", "need", "available"]
        .iter()
        .map(|w| w.to_string())
        .collect()
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            min_tokens: default_min_tokens(),
            min_district_token_len: default_min_district_token_len(),
            ignored_words: default_ignored_words(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Prepended to numeric phone fields
    #[serde(default = "default_phone_prefix")]
    pub phone_prefix: String,

    /// Source cited at the end of every result reply
    #[serde(default = "default_attribution")]
    pub attribution: String,

    /// Bookkeeping fields never shown to users
    #[serde(default = "default_hidden_fields")]
    pub hidden_fields: Vec<String>,
}

fn default_phone_prefix() -> String {
    "+91 ".into()
}
fn default_attribution() -> String {
    "https://life.coronasafe.network/".into()
}
fn default_hidden_fields() -> Vec<String> {
    [
        "id",
        "lastVerifiedOn",
        "verificationStatus",
        "createdTime",
        "verifiedBy",
        "name",
        "type",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            phone_prefix: default_phone_prefix(),
            attribution: default_attribution(),
            hidden_fields: default_hidden_fields(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Incidents are POSTed here as JSON when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Sent as a bearer token with each incident
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl std::fmt::Debug for ReportingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingConfig")
            .field("url", &self.url)
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.lifeline/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `TELEGRAM_BOT_TOKEN`
    /// - `LIFELINE_FEED_URL`
    /// - `LIFELINE_REPORT_URL`, `LIFELINE_REPORT_TOKEN`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Override settings from the environment. `lookup` is `std::env::var`
    /// in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(url) = non_empty("LIFELINE_FEED_URL") {
            self.feed.base_url = url;
        }
        if let Some(url) = non_empty("LIFELINE_REPORT_URL") {
            self.reporting.url = Some(url);
        }
        if let Some(token) = non_empty("LIFELINE_REPORT_TOKEN") {
            self.reporting.token = Some(token);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lifeline")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "query.page_size must be at least 1".into(),
            ));
        }

        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "feed.timeout_secs must be at least 1".into(),
            ));
        }

        if !self.feed.base_url.starts_with("http://") && !self.feed.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "feed.base_url must be an http(s) URL, got '{}'",
                self.feed.base_url
            )));
        }

        // Alias and endpoint checks live with the catalog.
        Catalog::from_config(self).map(|_| ())
    }

    /// Whether the Telegram transport can start.
    pub fn has_bot_token(&self) -> bool {
        self.telegram.bot_token.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramSettings::default(),
            feed: FeedConfig::default(),
            categories: default_categories(),
            query: QueryConfig::default(),
            format: FormatConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for lifeline_core::Error {
    fn from(e: ConfigError) -> Self {
        lifeline_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.query.page_size, 3);
        assert_eq!(config.categories.len(), Category::ALL.len());
        assert!(!config.has_bot_token());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.feed.base_url, config.feed.base_url);
        assert_eq!(parsed.categories.len(), config.categories.len());
        assert_eq!(parsed.format.hidden_fields, config.format.hidden_fields);
    }

    #[test]
    fn zero_page_size_rejected() {
        let mut config = AppConfig::default();
        config.query.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_feed_rejected() {
        let mut config = AppConfig::default();
        config.feed.base_url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.query.page_size, 3);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[query]
page_size = 5

[categories.oxygen]
endpoint = "https://mirror.example.org/oxygen.json"
aliases = ["oxygen", "o2", "cylinder"]
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.query.page_size, 5);
        assert_eq!(config.query.min_tokens, 2);
        assert_eq!(config.format.phone_prefix, "+91 ");
        // A categories table in the file replaces the default table.
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[&Category::Oxygen].aliases.len(), 3);
    }

    #[test]
    fn unparseable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "query = [").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("LIFELINE_FEED_URL", "http://localhost:8080/data"),
            ("LIFELINE_REPORT_URL", "https://errors.example.org/ingest"),
            ("LIFELINE_REPORT_TOKEN", ""),
        ]);
        let mut config = AppConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.feed.base_url, "http://localhost:8080/data");
        assert!(config.reporting.url.is_some());
        // Empty values are ignored.
        assert!(config.reporting.token.is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = AppConfig::default();
        config.telegram.bot_token = Some("123:secret".into());
        config.reporting.token = Some("hunter2".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("life-api.coronasafe.network"));
        assert!(toml_str.contains("page_size"));
    }
}
