//! Grid coordinates and validated patterns
//!
//! A [`Pattern`] can only be obtained through [`Pattern::validate`], so any
//! value of that type satisfies the submission-time constraints: length in
//! `[MIN_PATTERN_POINTS, MAX_PATTERN_POINTS]`, integer coordinates inside the
//! grid, and no duplicate cells.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ValidationError;

/// Grid edge length used by the deployed collection page
pub const DEFAULT_GRID_SIZE: u32 = 32;

/// Fewest dots accepted in one submission
pub const MIN_PATTERN_POINTS: usize = 80;

/// Most dots accepted in one submission
pub const MAX_PATTERN_POINTS: usize = 1024;

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 8-connected neighbourhood test (Chebyshev distance 1, excluding self)
    pub fn is_adjacent(&self, other: &Coordinate) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }

    /// Euclidean distance between two cells
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Coordinate as received on the wire, before integer and bounds checks
///
/// JSON numbers are accepted as `f64` so that `1.5` can be reported as a
/// validation failure instead of a generic body rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawCoordinate {
    pub x: f64,
    pub y: f64,
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        Self {
            x: f64::from(c.x),
            y: f64::from(c.y),
        }
    }
}

/// Validated, immutable sequence of distinct grid cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Pattern(Vec<Coordinate>);

impl Pattern {
    /// Validate raw wire coordinates against a `grid_size` x `grid_size` grid
    ///
    /// Checks run in order: length, then per coordinate integer-ness and
    /// bounds, then duplicates. The first violation is returned.
    pub fn validate(raw: &[RawCoordinate], grid_size: u32) -> Result<Self, ValidationError> {
        if raw.len() < MIN_PATTERN_POINTS || raw.len() > MAX_PATTERN_POINTS {
            return Err(ValidationError::PatternLength {
                len: raw.len(),
                min: MIN_PATTERN_POINTS,
                max: MAX_PATTERN_POINTS,
            });
        }

        let mut seen = HashSet::with_capacity(raw.len());
        let mut points = Vec::with_capacity(raw.len());

        for (index, coord) in raw.iter().enumerate() {
            let point = to_grid_cell(index, coord, grid_size)?;
            if !seen.insert(point) {
                return Err(ValidationError::DuplicateCoordinate {
                    x: point.x,
                    y: point.y,
                });
            }
            points.push(point);
        }

        Ok(Self(points))
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn to_grid_cell(
    index: usize,
    coord: &RawCoordinate,
    grid_size: u32,
) -> Result<Coordinate, ValidationError> {
    let is_integer = |v: f64| v.is_finite() && v.fract() == 0.0;
    if !is_integer(coord.x) || !is_integer(coord.y) {
        return Err(ValidationError::NonIntegerCoordinate { index });
    }

    let limit = f64::from(grid_size);
    if coord.x < 0.0 || coord.x >= limit || coord.y < 0.0 || coord.y >= limit {
        return Err(ValidationError::CoordinateOutOfBounds {
            index,
            x: coord.x as i64,
            y: coord.y as i64,
            grid_size,
        });
    }

    // In range of [0, grid_size) so the casts are exact
    Ok(Coordinate::new(coord.x as i32, coord.y as i32))
}
