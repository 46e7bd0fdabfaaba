use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::logs::NewLogRecord;
use crate::relay::{relay_submission, RelayRequest};
use crate::server::AppState;
use crate::session::SessionUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    #[serde(default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayBody {
    #[serde(default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub fields: Vec<(String, String)>,
    #[serde(default)]
    pub destination: Option<String>,
}

/// POST /api/logs/store - persist a submission without relaying it
pub async fn store(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<StoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let form_type = payload.form_type.unwrap_or_default();
    if form_type.trim().is_empty() {
        return Err(ApiError::bad_request("Missing formType"));
    }

    let record = NewLogRecord {
        user_id: user.id.clone(),
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        form_type,
        fields: payload.fields,
    };

    state.logs.insert(&record).await?;

    Ok(Json(json!({ "ok": true })))
}

/// POST /api/logs/relay - deliver a submission to the webhook destination,
/// then persist it
pub async fn relay(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<RelayBody>,
) -> Result<Json<Value>, ApiError> {
    let form_type = payload.form_type.unwrap_or_default();
    if form_type.trim().is_empty() {
        return Err(ApiError::bad_request("Missing formType"));
    }

    let destination = payload
        .destination
        .filter(|d| !d.trim().is_empty())
        .or_else(|| state.config.webhook.default_url.clone())
        .ok_or_else(|| ApiError::bad_request("Missing webhook destination"))?;

    let request = RelayRequest {
        form_name: form_type,
        fields: payload.fields,
        destination,
    };

    relay_submission(
        state.discord.as_ref(),
        state.sink.as_ref(),
        &state.logs,
        &user,
        &state.config.webhook,
        request,
    )
    .await?;

    Ok(Json(json!({ "ok": true })))
}
