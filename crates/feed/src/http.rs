//! HTTP feed client.
//!
//! One GET per query against the category's catalog endpoint, bounded by
//! `feed.timeout_secs`. Non-2xx statuses, transport failures and bad
//! payloads all surface as [`FeedError`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lifeline_config::{Catalog, FeedConfig};
use lifeline_core::error::FeedError;
use lifeline_core::{Category, Record};
use tracing::{debug, warn};

use crate::{DataSource, parse_snapshot};

/// Reads category snapshots over HTTP.
pub struct HttpFeed {
    catalog: Arc<Catalog>,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(config: &FeedConfig, catalog: Arc<Catalog>) -> Result<Self, FeedError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FeedError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            catalog,
            client,
            timeout,
        })
    }
}

#[async_trait]
impl DataSource for HttpFeed {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Record>, FeedError> {
        let url = self
            .catalog
            .endpoint(category)
            .ok_or_else(|| FeedError::NotConfigured(category.to_string()))?;

        debug!(%category, %url, "Fetching feed snapshot");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(format!("{url} after {}s", self.timeout.as_secs()))
            } else {
                FeedError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%category, status = status.as_u16(), "Feed returned error status");
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(format!("{url} after {}s", self.timeout.as_secs()))
            } else {
                FeedError::Network(e.to_string())
            }
        })?;

        let records = parse_snapshot(&body)?;
        debug!(%category, count = records.len(), "Feed snapshot parsed");
        Ok(records)
    }
}
