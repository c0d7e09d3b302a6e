//! Database access layer for dotgrid-collect
//!
//! The submission store and the contribution ledger are separate modules with
//! no shared query: nothing here accepts a submission id and returns an
//! identity, or the reverse.

pub mod ledger;
pub mod reset;
pub mod stats;
pub mod submissions;

pub use dotgrid_common::db::init::init_database;

use chrono::{DateTime, Utc};
use dotgrid_common::{time, Error, Result};

/// Decode a stored timestamp column, reporting failures as storage errors
pub(crate) fn decode_timestamp(text: &str) -> Result<DateTime<Utc>> {
    time::from_db_timestamp(text).map_err(|e| Error::Storage(sqlx::Error::Decode(Box::new(e))))
}
