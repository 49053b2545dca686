//! leadline-router - Lead routing service entry point
//!
//! Assigns inbound sales/service leads to human callers in real time and
//! broadcasts assignment/status changes to connected dashboards over SSE.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leadline_router::config::{Args, Config};
use leadline_router::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadline_router=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any database delay
    info!(
        "Starting Leadline Router v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = Config::resolve(&args).context("Failed to resolve configuration")?;
    info!("Database path: {}", config.db_path.display());

    let pool = leadline_common::db::init_database(&config.db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port)
        .parse()
        .context("Invalid bind address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("leadline-router listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Live updates:  http://{}/events", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
