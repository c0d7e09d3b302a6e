//! Database initialization
//!
//! Two tables live in one SQLite file:
//! - `submissions`: anonymous pattern content, keyed by auto-assigned id
//! - `contribution_ledger`: per-identity counts, keyed by unique username
//!
//! No column links one table to the other.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL allows concurrent readers alongside the single writer
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let options = SqliteConnectOptions::from_str(&db_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    let mut conn = pool.acquire().await?;
    create_schema(&mut conn).await?;

    Ok(pool)
}

/// Create both tables and their indexes (idempotent)
pub async fn create_schema(conn: &mut SqliteConnection) -> Result<()> {
    create_submissions_table(conn).await?;
    create_contribution_ledger_table(conn).await?;
    Ok(())
}

/// Drop both tables
///
/// Only called inside the reset transaction, which recreates them before
/// committing.
pub async fn drop_schema(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS submissions")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS contribution_ledger")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn create_submissions_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            points TEXT NOT NULL,
            label TEXT NOT NULL DEFAULT 'human',
            grid_size TEXT NOT NULL DEFAULT '32x32',
            features TEXT NOT NULL,
            timestamp_bucket TEXT NOT NULL,
            opted_in_for_credit INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_timestamp_bucket ON submissions(timestamp_bucket)",
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn create_contribution_ledger_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contribution_ledger (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT UNIQUE NOT NULL,
            contribution_count INTEGER NOT NULL DEFAULT 0,
            opted_out INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // Serves the leaderboard filter + ordering
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_ledger_rank
        ON contribution_ledger(opted_out, contribution_count DESC, updated_at ASC)
        "#,
    )
    .execute(&mut *conn)
    .await?;

    Ok(())
}
