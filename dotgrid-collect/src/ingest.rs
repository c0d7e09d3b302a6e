//! Ingestion coordinator
//!
//! Validates incoming patterns, runs feature extraction, and writes to the
//! submission store and (optionally) the contribution ledger.
//!
//! **Transaction shape for a credited submission:**
//! 1. `BEGIN`, insert the submission
//! 2. `SAVEPOINT`, upsert the ledger entry
//! 3. On ledger failure roll back to the savepoint only
//! 4. `COMMIT`
//!
//! A stored pattern is worth more than an exact ledger, so a ledger failure
//! keeps the submission and is reported as [`Error::Consistency`]. Re-sending
//! the pattern is safe for the store, re-crediting is not: check
//! [`IngestionCoordinator::contribution`] before retrying.

use dotgrid_common::db::models::{LedgerEntry, SubmissionRecord};
use dotgrid_common::{compute_features, time, Error, Pattern, RawCoordinate, Result, ValidationError};
use sqlx::{Connection, SqlitePool};
use tracing::{debug, error, warn};

use crate::db::{ledger, submissions};

/// Credit request attached to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    /// Identity as authenticated by the caller
    pub identity: String,
    /// Hide this identity from the leaderboard (overwrites the stored flag)
    pub opted_out: bool,
}

/// What a combined submission did
///
/// Holds no submission id, so the caller cannot pair the identity it supplied
/// with the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub points_submitted: usize,
    pub credited: bool,
}

/// Coordinates pattern validation, extraction, and persistence
#[derive(Debug, Clone)]
pub struct IngestionCoordinator {
    pool: SqlitePool,
    grid_size: u32,
}

impl IngestionCoordinator {
    pub fn new(pool: SqlitePool, grid_size: u32) -> Self {
        Self { pool, grid_size }
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Validate, extract, and store one pattern without touching the ledger
    pub async fn submit_pattern(
        &self,
        raw: &[RawCoordinate],
        opted_in_for_credit: bool,
    ) -> Result<SubmissionRecord> {
        let pattern = self.validate(raw)?;
        let features = compute_features(pattern.points(), self.grid_size);

        let new = submissions::NewSubmission {
            pattern: &pattern,
            features: &features,
            grid_size: self.grid_size,
            opted_in_for_credit,
            created_at: time::now(),
        };

        let mut conn = self.pool.acquire().await?;
        let record = submissions::insert_submission(&mut conn, &new)
            .await
            .inspect_err(|e| error!("Failed to store submission: {}", e))?;

        debug!(
            points = record.points.len(),
            bucket = %record.timestamp_bucket,
            "Stored submission"
        );
        Ok(record)
    }

    /// Count one contribution for `identity` (the credit path on its own)
    pub async fn record_contribution(&self, identity: &str, opted_out: bool) -> Result<LedgerEntry> {
        validate_identity(identity)?;

        let mut conn = self.pool.acquire().await?;
        ledger::increment(&mut conn, identity, opted_out, time::now())
            .await
            .inspect_err(|e| error!("Failed to update contribution ledger: {}", e))
    }

    /// Current ledger state for `identity`
    pub async fn contribution(&self, identity: &str) -> Result<Option<LedgerEntry>> {
        ledger::get_entry(&self.pool, identity).await
    }

    /// Store a pattern and, when opted in with a contributor, credit it
    ///
    /// All validation happens before any write. The ledger is touched only
    /// when `opted_in_for_credit` is true and `contributor` is present.
    pub async fn submit(
        &self,
        raw: &[RawCoordinate],
        opted_in_for_credit: bool,
        contributor: Option<&Contributor>,
    ) -> Result<SubmitOutcome> {
        let pattern = self.validate(raw)?;
        let credit = contributor.filter(|_| opted_in_for_credit);
        if let Some(c) = credit {
            validate_identity(&c.identity)?;
        }

        let features = compute_features(pattern.points(), self.grid_size);
        let now = time::now();
        let new = submissions::NewSubmission {
            pattern: &pattern,
            features: &features,
            grid_size: self.grid_size,
            opted_in_for_credit,
            created_at: now,
        };

        let mut tx = self.pool.begin().await?;

        submissions::insert_submission(&mut tx, &new)
            .await
            .inspect_err(|e| error!("Failed to store submission: {}", e))?;

        let mut ledger_failed = false;
        if let Some(c) = credit {
            let mut savepoint = tx.begin().await?;
            match ledger::increment(&mut savepoint, &c.identity, c.opted_out, now).await {
                Ok(_) => savepoint.commit().await?,
                Err(e) => {
                    error!("Contribution ledger update failed, keeping submission: {}", e);
                    savepoint.rollback().await?;
                    ledger_failed = true;
                }
            }
        }

        tx.commit()
            .await
            .inspect_err(|e| error!("Failed to commit submission: {}", e))?;

        debug!(points = pattern.len(), "Stored submission");

        if ledger_failed {
            return Err(Error::Consistency(
                "pattern stored but contribution was not recorded".to_string(),
            ));
        }

        Ok(SubmitOutcome {
            points_submitted: pattern.len(),
            credited: credit.is_some(),
        })
    }

    fn validate(&self, raw: &[RawCoordinate]) -> Result<Pattern> {
        Pattern::validate(raw, self.grid_size).map_err(|e| {
            warn!("Rejected pattern: {}", e);
            Error::Validation(e)
        })
    }
}

fn validate_identity(identity: &str) -> std::result::Result<(), ValidationError> {
    if identity.trim().is_empty() {
        return Err(ValidationError::EmptyIdentity);
    }
    Ok(())
}
