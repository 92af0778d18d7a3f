//! Fault reporting for Lifeline.
//!
//! When a message handler fails unexpectedly, the failure is captured as
//! an [`Incident`] and handed to an [`ErrorReporter`]. With no sink
//! configured the incident only reaches the logs; with a webhook sink it is
//! also POSTed as JSON.

pub mod model;
pub mod reporter;

pub use model::{Incident, IncidentKind};
pub use reporter::{ErrorReporter, NoopReporter, WebhookReporter, from_config};

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("incident delivery failed: {0}")]
    Delivery(String),
}
