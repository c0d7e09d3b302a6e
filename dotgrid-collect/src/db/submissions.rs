//! Submission store
//!
//! Append-only, identity-free pattern records. Rows are only removed by the
//! full reset.

use chrono::{DateTime, Utc};
use dotgrid_common::db::models::{grid_size_label, SubmissionRecord, LABEL_HUMAN};
use dotgrid_common::{time, Coordinate, FeatureVector, Pattern, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};

use super::decode_timestamp;

/// Values for a submission about to be written
#[derive(Debug, Clone)]
pub struct NewSubmission<'a> {
    pub pattern: &'a Pattern,
    pub features: &'a FeatureVector,
    pub grid_size: u32,
    pub opted_in_for_credit: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert one submission and return the stored record
///
/// Takes a connection so the caller can run it inside a transaction.
pub async fn insert_submission(
    conn: &mut SqliteConnection,
    new: &NewSubmission<'_>,
) -> Result<SubmissionRecord> {
    // Prepare all data before touching the connection
    let points = serde_json::to_string(new.pattern.points())?;
    let features = serde_json::to_string(new.features)?;
    let grid_size = grid_size_label(new.grid_size);
    let bucket = time::timestamp_bucket(new.created_at);
    let created_at = time::to_db_timestamp(new.created_at);

    let id = sqlx::query(
        r#"
        INSERT INTO submissions (
            points, label, grid_size, features,
            timestamp_bucket, opted_in_for_credit, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&points)
    .bind(LABEL_HUMAN)
    .bind(&grid_size)
    .bind(&features)
    .bind(&bucket)
    .bind(new.opted_in_for_credit)
    .bind(&created_at)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(SubmissionRecord {
        id,
        points: new.pattern.points().to_vec(),
        label: LABEL_HUMAN.to_string(),
        grid_size,
        features: new.features.clone(),
        timestamp_bucket: bucket,
        opted_in_for_credit: new.opted_in_for_credit,
        // Round-trip through the stored text so the returned value equals a later read
        created_at: decode_timestamp(&created_at)?,
    })
}

/// Load a submission by id
pub async fn get_submission(pool: &SqlitePool, id: i64) -> Result<Option<SubmissionRecord>> {
    let row = sqlx::query(
        r#"
        SELECT id, points, label, grid_size, features,
               timestamp_bucket, opted_in_for_credit, created_at
        FROM submissions
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(record_from_row).transpose()
}

/// Most recent submissions first, for export and inspection
pub async fn list_recent_submissions(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<SubmissionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, points, label, grid_size, features,
               timestamp_bucket, opted_in_for_credit, created_at
        FROM submissions
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    rows.iter().map(record_from_row).collect()
}

/// Total number of stored submissions
pub async fn count_submissions(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn record_from_row(row: &SqliteRow) -> Result<SubmissionRecord> {
    let points: String = row.try_get("points")?;
    let points: Vec<Coordinate> = serde_json::from_str(&points)?;

    let features: String = row.try_get("features")?;
    let features: FeatureVector = serde_json::from_str(&features)?;

    let created_at: String = row.try_get("created_at")?;

    Ok(SubmissionRecord {
        id: row.try_get("id")?,
        points,
        label: row.try_get("label")?,
        grid_size: row.try_get("grid_size")?,
        features,
        timestamp_bucket: row.try_get("timestamp_bucket")?,
        opted_in_for_credit: row.try_get("opted_in_for_credit")?,
        created_at: decode_timestamp(&created_at)?,
    })
}
