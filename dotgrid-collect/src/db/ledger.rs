//! Contribution ledger
//!
//! Identity-keyed counters, kept apart from submission content. The
//! increment is a single upsert statement, so concurrent increments for the
//! same identity serialize on SQLite's write lock and none are lost.

use chrono::{DateTime, Utc};
use dotgrid_common::db::models::{LeaderboardEntry, LedgerEntry};
use dotgrid_common::{time, Result, ValidationError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::decode_timestamp;

/// Smallest accepted leaderboard limit
pub const MIN_LEADERBOARD_LIMIT: i64 = 1;

/// Largest accepted leaderboard limit
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

/// Count one contribution for `identity`
///
/// Creates the entry with count 1 when absent, otherwise adds 1. `opted_out`
/// overwrites the stored flag on every call (last write wins).
pub async fn increment(
    conn: &mut SqliteConnection,
    identity: &str,
    opted_out: bool,
    now: DateTime<Utc>,
) -> Result<LedgerEntry> {
    let updated_at = time::to_db_timestamp(now);

    let row = sqlx::query(
        r#"
        INSERT INTO contribution_ledger (username, contribution_count, opted_out, updated_at)
        VALUES (?, 1, ?, ?)
        ON CONFLICT(username) DO UPDATE SET
            contribution_count = contribution_count + 1,
            opted_out = excluded.opted_out,
            updated_at = excluded.updated_at
        RETURNING username, contribution_count, opted_out, updated_at
        "#,
    )
    .bind(identity)
    .bind(opted_out)
    .bind(&updated_at)
    .fetch_one(&mut *conn)
    .await?;

    entry_from_row(&row)
}

/// Look up the current entry for `identity`
///
/// Used to re-check ledger state before retrying a failed credit.
pub async fn get_entry(pool: &SqlitePool, identity: &str) -> Result<Option<LedgerEntry>> {
    let row = sqlx::query(
        r#"
        SELECT username, contribution_count, opted_out, updated_at
        FROM contribution_ledger
        WHERE username = ?
        "#,
    )
    .bind(identity)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(entry_from_row).transpose()
}

/// Top contributors who have not opted out
///
/// Ordered by count descending, then earliest `updated_at`, then insertion
/// order. `limit` must be within `[1, 100]`.
pub async fn get_leaderboard(pool: &SqlitePool, limit: i64) -> Result<Vec<LeaderboardEntry>> {
    if !(MIN_LEADERBOARD_LIMIT..=MAX_LEADERBOARD_LIMIT).contains(&limit) {
        return Err(ValidationError::LimitOutOfRange { limit }.into());
    }

    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT username, contribution_count
        FROM contribution_ledger
        WHERE opted_out = 0 AND contribution_count > 0
        ORDER BY contribution_count DESC, updated_at ASC, id ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(identity, contribution_count)| LeaderboardEntry {
            identity,
            contribution_count,
        })
        .collect())
}

fn entry_from_row(row: &SqliteRow) -> Result<LedgerEntry> {
    let updated_at: String = row.try_get("updated_at")?;

    Ok(LedgerEntry {
        username: row.try_get("username")?,
        contribution_count: row.try_get("contribution_count")?,
        opted_out: row.try_get("opted_out")?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}
