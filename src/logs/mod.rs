pub mod record;
pub mod repository;

pub use record::{LogRecord, NewLogRecord, SummaryRow};
pub use repository::{LogRepository, StoreError};

use async_trait::async_trait;

/// Append seam over the log table so the relay can be exercised against an
/// in-memory store in tests.
#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, record: &NewLogRecord) -> Result<(), StoreError>;
}

#[async_trait]
impl LogStore for LogRepository {
    async fn append(&self, record: &NewLogRecord) -> Result<(), StoreError> {
        self.insert(record).await
    }
}
