//! # dotgrid common library
//!
//! Shared code for the dotgrid pattern collection service:
//! - Coordinate and pattern types with submission-time validation
//! - Feature extraction (pure, deterministic)
//! - Database schema and persisted models
//! - Configuration loading
//! - Error taxonomy and timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod pattern;
pub mod time;

pub use error::{Error, Result, ValidationError};
pub use features::{compute_features, FeatureVector};
pub use pattern::{Coordinate, Pattern, RawCoordinate};
