//! Full-store reset
//!
//! Irrecoverable. Both tables are dropped and recreated in one transaction:
//! SQLite DDL is transactional and WAL readers keep their snapshot, so a
//! concurrent query sees either all pre-reset rows or the empty stores.

use dotgrid_common::db::init::{create_schema, drop_schema};
use dotgrid_common::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Destroy and recreate the submission store and the contribution ledger
pub async fn reset_all(pool: &SqlitePool) -> Result<()> {
    warn!("Resetting database: all submissions and ledger entries will be deleted");

    let mut tx = pool.begin().await?;
    drop_schema(&mut tx).await?;
    create_schema(&mut tx).await?;
    tx.commit().await?;

    info!("Database reset complete");
    Ok(())
}
