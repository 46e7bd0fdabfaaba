use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::discord::DiscordError;
use crate::error::ApiError;
use crate::server::AppState;
use crate::session::{self, SessionUser};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /api/login - redirect to the identity provider's authorize URL
pub async fn login(State(state): State<AppState>) -> Response {
    found(&state.discord.authorize_url())
}

/// GET /api/callback?code= - complete login
///
/// Exchanges the code, fetches profile and guild membership, derives
/// capabilities, and establishes the session cookie. Denied logins land on
/// the unauthorized page; any upstream failure clears the session and
/// surfaces a generic 500. No partial session is ever persisted.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let code = match query.code.filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => return ApiError::bad_request("Missing code").into_response(),
    };

    let user = match complete_login(&state, &code).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return redirect_with_cookie(
                "/unauthorized.html",
                session::clear_cookie(&state.config.session),
            );
        }
        Err(e) => {
            tracing::error!("oauth callback failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::SET_COOKIE, session::clear_cookie(&state.config.session))],
                Json(json!({ "ok": false, "error": "Login failed" })),
            )
                .into_response();
        }
    };

    match session::issue(&user, &state.config.session) {
        Ok(token) => redirect_with_cookie(
            "/",
            session::session_cookie(&token, &state.config.session),
        ),
        Err(e) => {
            tracing::error!("failed to sign session: {}", e);
            ApiError::internal("Login failed").into_response()
        }
    }
}

/// GET /api/logout - clear the session cookie
pub async fn logout(State(state): State<AppState>) -> Response {
    redirect_with_cookie("/", session::clear_cookie(&state.config.session))
}

/// GET /api/me - current identity, or null when not logged in
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let user = session::from_headers(&headers, &state.config.session);
    Json(json!({ "ok": true, "user": user }))
}

async fn complete_login(
    state: &AppState,
    code: &str,
) -> Result<Option<SessionUser>, DiscordError> {
    let access_token = state.discord.exchange_code(code).await?;
    let profile = state.discord.fetch_user(&access_token).await?;
    let member = state.discord.fetch_member(&access_token).await?;

    let capabilities = state.policy.capabilities_for(&member.roles);
    if !capabilities.can_login {
        return Ok(None);
    }

    let display_name = member
        .nick
        .clone()
        .or_else(|| profile.global_name.clone())
        .unwrap_or_else(|| profile.username.clone());

    Ok(Some(SessionUser {
        id: profile.id,
        username: profile.username,
        display_name,
        roles: member.roles,
        capabilities,
    }))
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn redirect_with_cookie(location: &str, cookie: String) -> Response {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, cookie),
        ],
    )
        .into_response()
}
