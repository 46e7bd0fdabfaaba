use serde::{Deserialize, Serialize};
use std::env;

use crate::access::AccessConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub discord: DiscordConfig,
    pub webhook: WebhookConfig,
    pub http: HttpConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secret: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub guild_id: String,
    pub bot_token: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Fallback destination when a relay request names none.
    pub default_url: Option<String>,
    /// Display name the webhook posts under.
    pub username: String,
    /// Optional line rendered above the field blocks of every message.
    pub header_line: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.session.secret = v;
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_MAX_AGE_SECS") {
            self.session.max_age_secs = v.parse().unwrap_or(self.session.max_age_secs);
        }

        // Discord overrides
        if let Ok(v) = env::var("DISCORD_CLIENT_ID") {
            self.discord.client_id = v;
        }
        if let Ok(v) = env::var("DISCORD_CLIENT_SECRET") {
            self.discord.client_secret = v;
        }
        if let Ok(v) = env::var("DISCORD_REDIRECT_URI") {
            self.discord.redirect_uri = v;
        }
        if let Ok(v) = env::var("DISCORD_GUILD_ID") {
            self.discord.guild_id = v;
        }
        if let Ok(v) = env::var("DISCORD_BOT_TOKEN") {
            self.discord.bot_token = v;
        }
        if let Ok(v) = env::var("DISCORD_API_BASE") {
            self.discord.api_base = v;
        }

        // Webhook overrides
        if let Ok(v) = env::var("WEBHOOK_URL") {
            self.webhook.default_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("WEBHOOK_USERNAME") {
            self.webhook.username = v;
        }
        if let Ok(v) = env::var("WEBHOOK_HEADER_LINE") {
            self.webhook.header_line = Some(v).filter(|s| !s.is_empty());
        }

        if let Ok(v) = env::var("HTTP_TIMEOUT_SECS") {
            self.http.timeout_secs = v.parse().unwrap_or(self.http.timeout_secs);
        }

        // Access policy: two deployment shapes, chosen by ACCESS_MODE
        let mode = env::var("ACCESS_MODE").unwrap_or_else(|_| "granular".into());
        self.access = if mode.eq_ignore_ascii_case("admin-tier") {
            AccessConfig::AdminTier {
                portal: csv_env("PORTAL_ROLE_IDS"),
                admin: csv_env("ADMIN_ROLE_IDS"),
            }
        } else {
            AccessConfig::Granular {
                portal: csv_env("PORTAL_ROLE_IDS"),
                dashboard: csv_env("DASHBOARD_ROLE_IDS"),
                remove_logs: csv_env("REMOVE_LOG_ROLE_IDS"),
                reset_stats: csv_env("RESET_STATS_ROLE_IDS"),
            }
        };

        self
    }

    fn base(environment: Environment, secure_cookies: bool, max_connections: u32) -> Self {
        Self {
            environment,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections,
                acquire_timeout_secs: 10,
            },
            session: SessionConfig {
                cookie_name: "portal_session".to_string(),
                secret: "change-me".to_string(),
                max_age_secs: 7 * 24 * 60 * 60,
                secure: secure_cookies,
            },
            discord: DiscordConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                guild_id: String::new(),
                bot_token: String::new(),
                api_base: "https://discord.com/api".to_string(),
            },
            webhook: WebhookConfig {
                default_url: None,
                username: "Portal Logs".to_string(),
                header_line: None,
            },
            http: HttpConfig { timeout_secs: 10 },
            access: AccessConfig::Granular {
                portal: vec![],
                dashboard: vec![],
                remove_logs: vec![],
                reset_stats: vec![],
            },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development, false, 10)
    }

    fn staging() -> Self {
        Self::base(Environment::Staging, true, 20)
    }

    fn production() -> Self {
        Self::base(Environment::Production, true, 50)
    }
}

/// Parse a comma-separated env var into trimmed, non-empty entries.
fn csv_env(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| split_csv(&v))
        .unwrap_or_default()
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
