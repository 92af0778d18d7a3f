//! Per-session result pagination.
//!
//! A new query stores its full ranked result list as the session's
//! dataset; each page request takes records off the front until the
//! dataset is exhausted, at which point the key is removed.

use std::sync::Arc;

use lifeline_core::error::SessionError;
use lifeline_core::{Record, SessionStore};
use serde_json::Value;

/// Session key holding the unread part of the last result list.
pub const DATASET_KEY: &str = "current_dataset";

pub struct Paginator {
    store: Arc<dyn SessionStore>,
    page_size: usize,
}

impl Paginator {
    pub fn new(store: Arc<dyn SessionStore>, page_size: usize) -> Self {
        Self { store, page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the session's dataset, discarding any leftover pages.
    /// An empty list clears the session.
    pub async fn store_dataset(
        &self,
        session_id: &str,
        records: &[Record],
    ) -> Result<(), SessionError> {
        if records.is_empty() {
            self.clear(session_id).await?;
            return Ok(());
        }
        let value = serde_json::to_value(records)
            .map_err(|e| SessionError::Storage(format!("failed to encode dataset: {e}")))?;
        self.store.set(session_id, DATASET_KEY, value).await
    }

    /// Take the next page using the configured page size.
    pub async fn take_page(&self, session_id: &str) -> Result<Vec<Record>, SessionError> {
        self.take(session_id, self.page_size).await
    }

    /// Remove and return up to `count` records from the front of the
    /// session's dataset. A session without a dataset yields nothing.
    pub async fn take(&self, session_id: &str, count: usize) -> Result<Vec<Record>, SessionError> {
        let Some(value) = self.store.get(session_id, DATASET_KEY).await? else {
            return Ok(Vec::new());
        };
        let mut records = decode(session_id, value)?;

        let rest = records.split_off(count.min(records.len()));
        if rest.is_empty() {
            self.store.remove(session_id, DATASET_KEY).await?;
        } else {
            let value = serde_json::to_value(&rest)
                .map_err(|e| SessionError::Storage(format!("failed to encode dataset: {e}")))?;
            self.store.set(session_id, DATASET_KEY, value).await?;
        }

        Ok(records)
    }

    /// Records still waiting to be paged.
    pub async fn remaining(&self, session_id: &str) -> Result<usize, SessionError> {
        match self.store.get(session_id, DATASET_KEY).await? {
            Some(value) => Ok(decode(session_id, value)?.len()),
            None => Ok(0),
        }
    }

    pub async fn clear(&self, session_id: &str) -> Result<(), SessionError> {
        self.store.remove(session_id, DATASET_KEY).await?;
        Ok(())
    }
}

fn decode(session_id: &str, value: Value) -> Result<Vec<Record>, SessionError> {
    serde_json::from_value(value).map_err(|e| SessionError::Corrupt {
        key: format!("{session_id}/{DATASET_KEY}"),
        reason: e.to_string(),
    })
}
