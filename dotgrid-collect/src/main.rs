//! dotgrid-collect - pattern collection service
//!
//! Serves pattern submission, the public leaderboard, and admin database
//! routes over HTTP. Authentication, CAPTCHA, and rate limiting are expected
//! from the fronting layer.

use anyhow::{Context, Result};
use clap::Parser;
use dotgrid_collect::{build_router, AppState};
use dotgrid_common::config::{Overrides, Settings, TomlConfig};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

/// Command-line arguments for dotgrid-collect
#[derive(Parser, Debug)]
#[command(name = "dotgrid-collect")]
#[command(about = "Dot pattern collection service")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "DOTGRID_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "DOTGRID_DATABASE")]
    database: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "DOTGRID_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "DOTGRID_PORT")]
    port: Option<u16>,

    /// Token required for admin routes
    #[arg(long, env = "DOTGRID_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let settings = Settings::resolve(
        Overrides {
            database_path: args.database,
            host: args.host,
            port: args.port,
            admin_token: args.admin_token,
        },
        file,
    )?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!(
        "Starting dotgrid-collect v{} (grid {}x{})",
        env!("CARGO_PKG_VERSION"),
        settings.grid_size,
        settings.grid_size
    );
    info!("Database path: {}", settings.database_path.display());

    let pool = dotgrid_collect::db::init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    if settings.admin_token.is_none() {
        info!("No admin token configured: admin routes are disabled");
    }

    let state = AppState::from_settings(pool.clone(), &settings);
    let app = build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("dotgrid-collect listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // In-flight writes have finished; flush WAL and close cleanly
    pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
