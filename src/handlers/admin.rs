use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::logs::LogRepository;
use crate::server::AppState;
use crate::summary::build_summaries;

/// GET /api/admin/logs/summary - non-archived counts grouped by
/// (user, form type)
pub async fn summary(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let rows = state.logs.summary().await.map_err(|e| {
        tracing::error!("summary failed: {}", e);
        ApiError::internal("Failed summary")
    })?;

    Ok(Json(json!({ "ok": true, "rows": rows })))
}

/// GET /api/admin/logs/users - summary rows reduced to sorted per-user
/// aggregates
pub async fn users(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let rows = state.logs.summary().await.map_err(|e| {
        tracing::error!("summary failed: {}", e);
        ApiError::internal("Failed summary")
    })?;

    Ok(Json(json!({ "ok": true, "users": build_summaries(&rows) })))
}

/// GET /api/admin/logs/user/:userId - most recent records for one user
pub async fn user_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let logs = state
        .logs
        .list_for_user(&user_id, LogRepository::DEFAULT_LIST_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!("user logs failed: {}", e);
            ApiError::internal("Failed user logs")
        })?;

    Ok(Json(json!({ "ok": true, "logs": logs })))
}

/// POST /api/admin/logs/archive/:id - soft-delete one record
pub async fn archive(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = id.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request("Invalid log id"));
    }
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid log id"))?;

    let updated = state.logs.archive_one(id).await.map_err(|e| {
        tracing::error!("archive log failed: {}", e);
        ApiError::internal("Failed to archive log")
    })?;

    Ok(Json(json!({ "ok": true, "updated": updated })))
}

/// POST /api/admin/logs/reset - soft-delete every non-archived record
pub async fn reset(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.logs.archive_all().await.map_err(|e| {
        tracing::error!("reset failed: {}", e);
        ApiError::internal("Failed reset")
    })?;

    Ok(Json(json!({ "ok": true })))
}
