use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::access::AccessPolicy;
use crate::config::AppConfig;
use crate::discord::DiscordClient;
use crate::handlers;
use crate::logs::LogRepository;
use crate::middleware::auth::{
    require_dashboard, require_remove_logs, require_reset_stats, require_session,
};
use crate::relay::WebhookSink;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub policy: Arc<AccessPolicy>,
    pub discord: Arc<DiscordClient>,
    pub sink: Arc<WebhookSink>,
    pub logs: LogRepository,
}

impl AppState {
    /// Wire the shared pieces: one timed HTTP client backs both the
    /// identity provider and the webhook sink.
    pub fn new(config: AppConfig, logs: LogRepository) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .build()?;

        let policy = AccessPolicy::new(config.access.clone());
        let discord = DiscordClient::new(config.discord.clone(), http.clone());
        let sink = WebhookSink::new(http);

        Ok(Self {
            config: Arc::new(config),
            policy: Arc::new(policy),
            discord: Arc::new(discord),
            sink: Arc::new(sink),
            logs,
        })
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes(state.clone()))
        .merge(member_routes(state.clone()))
        .merge(dashboard_routes(state.clone()))
        .merge(remove_routes(state.clone()))
        .merge(reset_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/login", get(handlers::auth::login))
        .route("/api/callback", get(handlers::auth::callback))
        .route("/api/logout", get(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
        .with_state(state)
}

fn member_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/discord/member/:id", get(handlers::discord::member_get))
        .route("/api/logs/store", post(handlers::logs::store))
        .route("/api/logs/relay", post(handlers::logs::relay))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state)
}

fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/logs/summary", get(handlers::admin::summary))
        .route("/api/admin/logs/users", get(handlers::admin::users))
        .route("/api/admin/logs/user/:userId", get(handlers::admin::user_logs))
        .route_layer(middleware::from_fn(require_dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state)
}

fn remove_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/logs/archive/:id", post(handlers::admin::archive))
        .route_layer(middleware::from_fn(require_remove_logs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state)
}

fn reset_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/admin/logs/reset", post(handlers::admin::reset))
        .route_layer(middleware::from_fn(require_reset_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.logs.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({ "ok": true, "database": "ok" })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "database": e.to_string() })),
        ),
    }
}
