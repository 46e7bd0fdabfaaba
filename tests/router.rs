//! Router-level tests: session gating, capability checks, and input
//! validation. The pool is lazily connected and the covered paths never
//! touch Postgres or the identity provider.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use portal_api::access::{AccessConfig, Capabilities};
use portal_api::config::{
    AppConfig, DatabaseConfig, DiscordConfig, Environment, HttpConfig, ServerConfig,
    SessionConfig, WebhookConfig,
};
use portal_api::logs::LogRepository;
use portal_api::server::{app, AppState};
use portal_api::session::{self, SessionUser};

fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            url: "postgres://postgres@127.0.0.1:5432/portal_test".to_string(),
            max_connections: 2,
            acquire_timeout_secs: 1,
        },
        session: SessionConfig {
            cookie_name: "portal_session".to_string(),
            secret: "router-test-secret".to_string(),
            max_age_secs: 7 * 24 * 60 * 60,
            secure: false,
        },
        discord: DiscordConfig {
            client_id: "4242".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://127.0.0.1/api/callback".to_string(),
            guild_id: "123456789012345678".to_string(),
            bot_token: "bot-token".to_string(),
            api_base: "https://discord.com/api".to_string(),
        },
        webhook: WebhookConfig {
            default_url: None,
            username: "Portal Logs".to_string(),
            header_line: None,
        },
        http: HttpConfig { timeout_secs: 2 },
        access: AccessConfig::Granular {
            portal: vec!["100".to_string()],
            dashboard: vec!["200".to_string()],
            remove_logs: vec!["200".to_string()],
            reset_stats: vec!["300".to_string()],
        },
    }
}

fn test_state() -> AppState {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    AppState::new(config, LogRepository::new(pool)).expect("state")
}

fn session_cookie(capabilities: Capabilities) -> String {
    let config = test_config();
    let user = SessionUser {
        id: "123456789012345678".to_string(),
        username: "quinoa".to_string(),
        display_name: "Quinoa".to_string(),
        roles: vec!["100".to_string()],
        capabilities,
    };
    let token = session::issue(&user, &config.session).expect("token");
    format!("{}={}", config.session.cookie_name, token)
}

fn member_capabilities() -> Capabilities {
    Capabilities {
        can_login: true,
        can_view_dashboard: false,
        can_remove_logs: false,
        can_reset_stats: false,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn me_without_session_returns_null_user() {
    let response = app(test_state())
        .oneshot(Request::get("/api/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert!(body["user"].is_null());
}

#[tokio::test]
async fn me_returns_session_identity() {
    let response = app(test_state())
        .oneshot(
            Request::get("/api/me")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "quinoa");
    assert_eq!(body["user"]["displayName"], "Quinoa");
    assert_eq!(body["user"]["canViewDashboard"], false);
}

#[tokio::test]
async fn login_redirects_to_provider() {
    let response = app(test_state())
        .oneshot(Request::get("/api/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert!(location.starts_with("https://discord.com/api/oauth2/authorize?"));
    assert!(location.contains("client_id=4242"));
    assert!(location.contains("guilds.members.read"));
}

#[tokio::test]
async fn callback_without_code_is_rejected() {
    let response = app(test_state())
        .oneshot(Request::get("/api/callback").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Missing code");
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let response = app(test_state())
        .oneshot(Request::get("/api/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie header");
    assert!(set_cookie.starts_with("portal_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn store_requires_login() {
    let response = app(test_state())
        .oneshot(
            Request::post("/api/logs/store")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"formType":"Patrol Log","fields":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn store_rejects_missing_form_type() {
    let response = app(test_state())
        .oneshot(
            Request::post("/api/logs/store")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"fields":[["Name","Alex"]]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing formType");
}

#[tokio::test]
async fn relay_requires_a_destination() {
    let response = app(test_state())
        .oneshot(
            Request::post("/api/logs/relay")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"formType":"Patrol Log","fields":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing webhook destination");
}

#[tokio::test]
async fn member_lookup_rejects_malformed_id() {
    let response = app(test_state())
        .oneshot(
            Request::get("/api/discord/member/not-a-real-id")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn admin_summary_requires_login() {
    let response = app(test_state())
        .oneshot(
            Request::get("/api/admin/logs/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_summary_requires_dashboard_capability() {
    let response = app(test_state())
        .oneshot(
            Request::get("/api/admin/logs/summary")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn archive_requires_remove_capability() {
    let response = app(test_state())
        .oneshot(
            Request::post("/api/admin/logs/archive/42")
                .header(header::COOKIE, session_cookie(member_capabilities()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn archive_rejects_non_numeric_id() {
    let mut capabilities = member_capabilities();
    capabilities.can_remove_logs = true;

    let response = app(test_state())
        .oneshot(
            Request::post("/api/admin/logs/archive/abc")
                .header(header::COOKIE, session_cookie(capabilities))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid log id");
}

#[tokio::test]
async fn reset_requires_reset_capability() {
    let mut capabilities = member_capabilities();
    capabilities.can_view_dashboard = true;
    capabilities.can_remove_logs = true;

    let response = app(test_state())
        .oneshot(
            Request::post("/api/admin/logs/reset")
                .header(header::COOKIE, session_cookie(capabilities))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn tampered_session_reads_as_logged_out() {
    let cookie = format!("{}tampered", session_cookie(member_capabilities()));

    let response = app(test_state())
        .oneshot(
            Request::post("/api/admin/logs/reset")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
