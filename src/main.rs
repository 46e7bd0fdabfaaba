use std::time::Duration;

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use portal_api::config::AppConfig;
use portal_api::logs::LogRepository;
use portal_api::server::{app, AppState};

#[derive(Parser)]
#[command(name = "portal-api")]
#[command(about = "Community portal backend - OAuth login, log relay and command dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override the listen port")]
        port: Option<u16>,
    },

    #[command(about = "Create the logs table and exit")]
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, DISCORD_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::InitDb => init_db(config).await,
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    if config.database.url.is_empty() {
        anyhow::bail!("DATABASE_URL is not set");
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    Ok(pool)
}

async fn init_db(config: AppConfig) -> anyhow::Result<()> {
    let pool = connect(&config).await?;
    LogRepository::new(pool).init().await?;
    tracing::info!("logs table ready");
    Ok(())
}

async fn serve(config: AppConfig, port_override: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("starting portal API in {:?} mode", config.environment);

    if config.discord.client_id.is_empty() {
        tracing::warn!("DISCORD_CLIENT_ID is not set; OAuth login will not work");
    }

    let pool = connect(&config).await?;
    let logs = LogRepository::new(pool);
    logs.init().await?;

    let port = port_override.unwrap_or(config.server.port);
    let state = AppState::new(config, logs)?;

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("portal API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
