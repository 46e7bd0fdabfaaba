//! Shared fakes for unit tests: member directory, webhook sink, log store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::discord::MemberDirectory;
use crate::logs::{LogStore, NewLogRecord, StoreError};
use crate::relay::message::WebhookMessage;
use crate::relay::sink::{DeliveryError, Sink};

/// Directory backed by a fixed name table; counts lookups so tests can
/// assert on memoization.
pub struct StaticDirectory {
    names: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl StaticDirectory {
    pub fn with_names(entries: &[(&str, &str)]) -> Self {
        Self {
            names: entries
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberDirectory for StaticDirectory {
    async fn display_name(&self, member_id: &str) -> String {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.names.get(member_id).cloned().unwrap_or_default()
    }
}

/// Sink that records delivered messages, or fails every delivery with the
/// given status.
pub struct RecordingSink {
    fail_with: Option<u16>,
    pub delivered: Mutex<Vec<(String, WebhookMessage)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            fail_with: None,
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            delivered: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn deliver(
        &self,
        destination: &str,
        message: &WebhookMessage,
    ) -> Result<(), DeliveryError> {
        if let Some(status) = self.fail_with {
            return Err(DeliveryError::Status { status });
        }
        self.delivered
            .lock()
            .await
            .push((destination.to_string(), message.clone()));
        Ok(())
    }
}

/// In-memory log store standing in for the Postgres-backed repository.
pub struct MemoryLogStore {
    pub records: Mutex<Vec<NewLogRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, record: &NewLogRecord) -> Result<(), StoreError> {
        if record.form_type.trim().is_empty() {
            return Err(StoreError::MissingField("formType"));
        }
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
