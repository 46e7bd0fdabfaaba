use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;

use crate::logs::record::{LogRecord, NewLogRecord, SummaryRow};

/// Errors from LogRepository writes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Append-only submission log with soft-delete semantics. Every operation
/// is a single parameterized statement; no multi-statement transactions.
#[derive(Clone)]
pub struct LogRepository {
    pool: PgPool,
}

impl LogRepository {
    pub const DEFAULT_LIST_LIMIT: i64 = 200;

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS logs (
                id BIGSERIAL PRIMARY KEY,
                user_id TEXT NOT NULL,
                username TEXT,
                display_name TEXT,
                form_type TEXT NOT NULL,
                fields JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                archived BOOLEAN NOT NULL DEFAULT FALSE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append one non-archived record; the timestamp is server-assigned.
    pub async fn insert(&self, record: &NewLogRecord) -> Result<(), StoreError> {
        if record.form_type.trim().is_empty() {
            return Err(StoreError::MissingField("formType"));
        }

        sqlx::query(
            "INSERT INTO logs (user_id, username, display_name, form_type, fields)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.user_id)
        .bind(&record.username)
        .bind(&record.display_name)
        .bind(&record.form_type)
        .bind(Json(&record.fields))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Non-archived records grouped by (user, form type). Row order is
    /// unspecified; consumers must not assume one.
    pub async fn summary(&self) -> Result<Vec<SummaryRow>, sqlx::Error> {
        sqlx::query_as::<_, SummaryRow>(
            "SELECT user_id, MAX(username) AS username, MAX(display_name) AS display_name,
                    form_type, COUNT(*) AS count
             FROM logs
             WHERE archived = FALSE
             GROUP BY user_id, form_type",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Most recent non-archived records for a user, newest first.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<LogRecord>, sqlx::Error> {
        sqlx::query_as::<_, LogRecord>(
            "SELECT id, user_id, username, display_name, form_type, fields, created_at, archived
             FROM logs
             WHERE archived = FALSE AND user_id = $1
             ORDER BY created_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Archive one record if not already archived. Idempotent: a second
    /// call reports zero rows updated, not an error.
    pub async fn archive_one(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE logs SET archived = TRUE WHERE id = $1 AND archived = FALSE")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Archive every currently non-archived record. Irreversible.
    pub async fn archive_all(&self) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE logs SET archived = TRUE WHERE archived = FALSE")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Connectivity probe for the health endpoint.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
