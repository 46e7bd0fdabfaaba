use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// One stored submission. Append-only: archive is the only mutation, and an
/// archived record is excluded from every active view but never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub id: i64,
    pub user_id: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub form_type: String,
    pub fields: Json<Vec<(String, String)>>,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
}

/// Submission about to be stored; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewLogRecord {
    pub user_id: String,
    pub username: String,
    pub display_name: String,
    pub form_type: String,
    pub fields: Vec<(String, String)>,
}

/// One (user, form type) group from the summary query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub user_id: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub form_type: String,
    pub count: i64,
}
