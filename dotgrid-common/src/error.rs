//! Common error types for dotgrid

use thiserror::Error;

/// Common result type for dotgrid operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the dotgrid crates
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied input violated a constraint (never silently corrected)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Database operation error (wraps sqlx::Error)
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Submission was stored but the contribution ledger was not updated
    ///
    /// Re-submitting is safe for the submission store but re-crediting is not;
    /// callers must re-check ledger state before retrying.
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Stored JSON (points or features) could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Input constraint violations
///
/// Display text names the constraint that failed so it can be shown to the
/// submitter as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid coordinates count. Must be between {min} and {max} points. Received: {len}")]
    PatternLength { len: usize, min: usize, max: usize },

    #[error("Coordinate {index} is not integer-valued")]
    NonIntegerCoordinate { index: usize },

    #[error("Coordinate {index} ({x}, {y}) is outside the {grid_size}x{grid_size} grid")]
    CoordinateOutOfBounds {
        index: usize,
        x: i64,
        y: i64,
        grid_size: u32,
    },

    #[error("Duplicate coordinate detected: ({x}, {y})")]
    DuplicateCoordinate { x: i32, y: i32 },

    #[error("Limit must be between 1 and 100. Received: {limit}")]
    LimitOutOfRange { limit: i64 },

    #[error("Contributor identity must not be empty")]
    EmptyIdentity,

    #[error("Invalid action '{action}'. Supported actions: reset")]
    UnsupportedAction { action: String },
}

impl Error {
    /// True for errors caused by the caller rather than the system
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}
