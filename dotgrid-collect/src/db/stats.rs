//! Aggregation queries over both stores
//!
//! Each view is read with one SQL statement so its counts come from a single
//! snapshot, even while a submission is being written.

use chrono::{DateTime, Utc};
use dotgrid_common::db::models::{DatabaseStats, TotalStats};
use dotgrid_common::{time, Result};
use sqlx::SqlitePool;
use tracing::warn;

/// Totals for the public leaderboard view
///
/// `recent_submissions` counts rows whose bucket equals the year-month of `now`.
pub async fn get_total_stats(pool: &SqlitePool, now: DateTime<Utc>) -> Result<TotalStats> {
    let bucket = time::timestamp_bucket(now);

    let (total_submissions, total_contributors, recent_submissions) =
        sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM submissions),
                (SELECT COUNT(*) FROM contribution_ledger WHERE contribution_count > 0),
                (SELECT COUNT(*) FROM submissions WHERE timestamp_bucket = ?)
            "#,
        )
        .bind(&bucket)
        .fetch_one(pool)
        .await?;

    Ok(TotalStats {
        total_submissions,
        total_contributors,
        recent_submissions,
    })
}

/// Monitoring view for operators
///
/// Storage size comes from SQLite page accounting; if that read fails the
/// size is reported as 0 and the remaining figures are still returned.
pub async fn get_database_stats(pool: &SqlitePool) -> Result<DatabaseStats> {
    let (total_submissions, total_contributors, oldest, newest) =
        sqlx::query_as::<_, (i64, i64, Option<String>, Option<String>)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM submissions),
                (SELECT COUNT(*) FROM contribution_ledger WHERE contribution_count > 0),
                (SELECT MIN(created_at) FROM submissions),
                (SELECT MAX(created_at) FROM submissions)
            "#,
        )
        .fetch_one(pool)
        .await?;

    let size_bytes = match sqlx::query_scalar::<_, i64>(
        "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
    )
    .fetch_one(pool)
    .await
    {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Could not read database size: {}", e);
            0
        }
    };

    Ok(DatabaseStats {
        total_submissions,
        total_contributors,
        database_size_kb: (size_bytes + 512) / 1024,
        oldest_submission: oldest.as_deref().map(super::decode_timestamp).transpose()?,
        newest_submission: newest.as_deref().map(super::decode_timestamp).transpose()?,
    })
}
