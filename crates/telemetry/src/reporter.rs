//! Incident sinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lifeline_config::ReportingConfig;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::TelemetryError;
use crate::model::Incident;

/// Where unexpected faults are forwarded.
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    fn name(&self) -> &str;

    async fn report(&self, incident: &Incident) -> Result<(), TelemetryError>;
}

/// Used when no external sink is configured.
pub struct NoopReporter;

#[async_trait]
impl ErrorReporter for NoopReporter {
    fn name(&self) -> &str {
        "none"
    }

    async fn report(&self, incident: &Incident) -> Result<(), TelemetryError> {
        debug!(incident = %incident.id, "No reporting sink configured");
        Ok(())
    }
}

/// POSTs incidents as JSON to an HTTP endpoint.
///
/// The HTTP client is only built when the first incident arrives, so a
/// healthy process never touches the sink.
pub struct WebhookReporter {
    url: String,
    token: Option<String>,
    client: OnceCell<reqwest::Client>,
    delivered: AtomicU64,
}

impl WebhookReporter {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            url: url.into(),
            token,
            client: OnceCell::new(),
            delivered: AtomicU64::new(0),
        }
    }

    /// Whether the sink has been contacted yet.
    pub fn is_initialized(&self) -> bool {
        self.client.initialized()
    }

    /// Incidents accepted by the sink so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    async fn client(&self) -> Result<&reqwest::Client, TelemetryError> {
        self.client
            .get_or_try_init(|| async {
                info!(url = %self.url, "Initializing error reporting sink");
                reqwest::Client::builder()
                    .timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| TelemetryError::Delivery(e.to_string()))
            })
            .await
    }
}

#[async_trait]
impl ErrorReporter for WebhookReporter {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn report(&self, incident: &Incident) -> Result<(), TelemetryError> {
        let client = self.client().await?;

        let mut request = client.post(&self.url).json(incident);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TelemetryError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TelemetryError::Delivery(format!(
                "sink returned status {}",
                response.status()
            )));
        }

        self.delivered.fetch_add(1, Ordering::Relaxed);
        debug!(incident = %incident.id, "Incident delivered");
        Ok(())
    }
}

/// Pick the reporter for the loaded configuration.
pub fn from_config(config: &ReportingConfig) -> Arc<dyn ErrorReporter> {
    match &config.url {
        Some(url) => Arc::new(WebhookReporter::new(url.clone(), config.token.clone())),
        None => Arc::new(NoopReporter),
    }
}
