use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::discord::is_snowflake;
use crate::server::AppState;

/// GET /api/discord/member/:id - resolve a member's display name
///
/// Malformed ids fail closed without querying upstream; an unknown member
/// or upstream failure degrades to an empty display name.
pub async fn member_get(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    let id = id.trim().to_string();

    if !is_snowflake(&id) {
        return Json(json!({ "ok": false }));
    }

    let display_name = state.discord.member_display_name(&id).await;
    Json(json!({ "ok": true, "displayName": display_name }))
}
