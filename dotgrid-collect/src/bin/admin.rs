//! Database administration utility
//!
//! **Usage:**
//! ```bash
//! dotgrid-admin [--database <file>] init
//! dotgrid-admin [--database <file>] stats
//! dotgrid-admin [--database <file>] recent [--limit N]
//! dotgrid-admin [--database <file>] reset --confirm "YES DELETE ALL"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dotgrid_collect::db::{self, stats, submissions};
use dotgrid_common::config::{Overrides, Settings, TomlConfig};
use std::path::PathBuf;
use tracing::info;

/// Exact phrase required by `reset`
const RESET_CONFIRMATION: &str = "YES DELETE ALL";

/// dotgrid database administration
#[derive(Parser, Debug)]
#[command(name = "dotgrid-admin")]
#[command(about = "Inspect, export, or reset the dotgrid database")]
struct Args {
    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "DOTGRID_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "DOTGRID_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and tables if missing
    Init,
    /// Print submission/contributor totals, size, and date range as JSON
    Stats,
    /// Print the most recent submissions (points and features) as JSON
    Recent {
        #[arg(long, default_value = "10")]
        limit: i64,
    },
    /// Permanently delete all submissions and ledger entries
    Reset {
        /// Must be exactly "YES DELETE ALL"
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = TomlConfig::load_or_default(args.config.as_deref())?;
    let settings = Settings::resolve(
        Overrides {
            database_path: args.database,
            ..Default::default()
        },
        file,
    )?;

    // Check before opening so a refused reset leaves no trace on disk
    if let Command::Reset { confirm } = &args.command {
        if confirm.as_deref() != Some(RESET_CONFIRMATION) {
            bail!(
                "Reset not confirmed. Re-run with --confirm \"{}\" to delete all data",
                RESET_CONFIRMATION
            );
        }
    }

    info!("Database path: {}", settings.database_path.display());
    let pool = db::init_database(&settings.database_path)
        .await
        .context("Failed to open database")?;

    match args.command {
        Command::Init => {
            info!("Database ready");
        }
        Command::Stats => {
            let stats = stats::get_database_stats(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Recent { limit } => {
            let records = submissions::list_recent_submissions(&pool, limit).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Reset { .. } => {
            db::reset::reset_all(&pool).await?;
            info!("All submissions and ledger entries deleted");
        }
    }

    pool.close().await;
    Ok(())
}
