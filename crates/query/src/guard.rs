//! Per-message fault boundary.
//!
//! Whatever goes wrong inside a handler, including a panic, the user gets
//! a short apology and the fault is logged and reported. One bad message
//! never takes the bot down.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use lifeline_core::{ChannelMessage, Reply};
use lifeline_telemetry::{ErrorReporter, Incident, IncidentKind};
use tracing::{error, warn};

use crate::messages;

/// Run `handler`, converting errors and panics into the generic error reply.
pub async fn guarded<F>(reporter: &dyn ErrorReporter, message: &ChannelMessage, handler: F) -> Reply
where
    F: Future<Output = lifeline_core::Result<Reply>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => fail(reporter, message, IncidentKind::Error, e.to_string()).await,
        Err(payload) => fail(reporter, message, IncidentKind::Panic, panic_text(&*payload)).await,
    }
}

async fn fail(
    reporter: &dyn ErrorReporter,
    message: &ChannelMessage,
    kind: IncidentKind,
    detail: String,
) -> Reply {
    let session_id = message.session_id();
    error!(
        session = %session_id,
        sender = %message.sender_id,
        text = %message.content,
        kind = ?kind,
        error = %detail,
        "Message handler failed"
    );

    let incident = Incident::new(
        session_id,
        message.sender_id.clone(),
        message.sender_name.clone(),
        message.content.clone(),
        kind,
        detail,
    );
    if let Err(e) = reporter.report(&incident).await {
        warn!(reporter = reporter.name(), incident = %incident.id, error = %e, "Incident not reported");
    }

    Reply::plain(messages::GENERIC_ERROR)
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lifeline_core::ChannelId;
    use lifeline_core::error::{Error, SessionError};
    use lifeline_telemetry::TelemetryError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        incidents: Mutex<Vec<Incident>>,
        fail: bool,
    }

    #[async_trait]
    impl ErrorReporter for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn report(&self, incident: &Incident) -> Result<(), TelemetryError> {
            self.incidents.lock().unwrap().push(incident.clone());
            if self.fail {
                return Err(TelemetryError::Delivery("sink down".into()));
            }
            Ok(())
        }
    }

    fn message() -> ChannelMessage {
        ChannelMessage {
            channel_id: ChannelId("telegram".into()),
            sender_id: "42".into(),
            sender_name: Some("Asha".into()),
            content: "oxygen mumbai".into(),
            chat_id: "42".into(),
            message_id: None,
            metadata: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn success_passes_through() {
        let reporter = Recorder::default();
        let reply = guarded(&reporter, &message(), async { Ok(Reply::plain("ok")) }).await;
        assert_eq!(reply, Reply::plain("ok"));
        assert!(reporter.incidents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_becomes_generic_reply_and_incident() {
        let reporter = Recorder::default();
        let reply = guarded(&reporter, &message(), async {
            Err(Error::Session(SessionError::Storage("disk full".into())))
        })
        .await;

        assert_eq!(reply.text, messages::GENERIC_ERROR);
        let incidents = reporter.incidents.lock().unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].kind, IncidentKind::Error);
        assert_eq!(incidents[0].session_id, "telegram:42");
        assert_eq!(incidents[0].message_text, "oxygen mumbai");
        assert!(incidents[0].error.contains("disk full"));
    }

    #[tokio::test]
    async fn panic_is_caught() {
        let reporter = Recorder::default();
        let reply = guarded(&reporter, &message(), async {
            let empty: Vec<Reply> = Vec::new();
            if empty.is_empty() {
                panic!("handler exploded");
            }
            Ok(empty[0].clone())
        })
        .await;

        assert_eq!(reply.text, messages::GENERIC_ERROR);
        let incidents = reporter.incidents.lock().unwrap();
        assert_eq!(incidents[0].kind, IncidentKind::Panic);
        assert_eq!(incidents[0].error, "handler exploded");
        assert_eq!(incidents[0].sender_name.as_deref(), Some("Asha"));
    }

    #[tokio::test]
    async fn reporter_failure_still_replies() {
        let reporter = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let reply = guarded(&reporter, &message(), async {
            Err(Error::Internal("boom".into()))
        })
        .await;
        assert_eq!(reply.text, messages::GENERIC_ERROR);
    }

    #[test]
    fn panic_payload_text() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_text(&*s), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_text(&*s), "owned");
        let s: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_text(&*s), "non-string panic payload");
    }
}
