//! Feature extraction for dot patterns
//!
//! Turns a set of grid cells into a fixed set of geometric and statistical
//! descriptors. The values are persisted as ground truth for a training
//! dataset, so every floating output is rounded to three decimals and the
//! pairwise computations keep their O(n²) form: swapping in a spatial index
//! would be faster but must produce identical rounded values.
//!
//! Definitions:
//! - **Adjacency**: two cells are neighbours when both coordinate deltas are
//!   at most 1 (8-connectivity), a cell is never its own neighbour
//! - **Nearest-neighbour distance**: Euclidean distance to the closest other
//!   cell
//! - **Clusters**: connected components of the adjacency graph
//! - **Radial symmetry**: `1 / (1 + variance)` of the distances from the grid
//!   centre `(g/2 - 0.5, g/2 - 0.5)`
//!
//! All variances and standard deviations are population statistics.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pattern::Coordinate;

/// Fixed-shape feature record computed from one pattern
///
/// Field order matches the persisted JSON layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub n_points: usize,
    pub adjacency_rate: f64,
    pub singleton_ratio: f64,
    pub mean_nn_distance: f64,
    pub std_nn_distance: f64,
    pub row_variance: f64,
    pub column_variance: f64,
    pub cluster_count: usize,
    pub mean_cluster_size: f64,
    pub max_cluster_size: usize,
    pub bounding_box_density: f64,
    pub radial_symmetry_score: f64,
    pub center_of_mass_x: f64,
    pub center_of_mass_y: f64,
    pub width: i64,
    pub height: i64,
    pub coverage_area: i64,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

/// Compute the feature vector for `points` on a `grid_size` x `grid_size` grid
///
/// Total and deterministic. An empty slice yields the all-zero vector.
/// Points are expected to be distinct, which [`crate::Pattern`] guarantees.
pub fn compute_features(points: &[Coordinate], grid_size: u32) -> FeatureVector {
    if points.is_empty() {
        return FeatureVector::default();
    }

    let n_points = points.len();
    let n = n_points as f64;

    // Bounding box
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0);
    let width = i64::from(max_x) - i64::from(min_x) + 1;
    let height = i64::from(max_y) - i64::from(min_y) + 1;
    let coverage_area = width * height;

    let adjacent = count_with_neighbour(points);
    let adjacency_rate = adjacent as f64 / n;
    let singleton_ratio = (n_points - adjacent) as f64 / n;

    let nn = nearest_neighbour_distances(points);
    let mean_nn_distance = mean(&nn);
    let std_nn_distance = variance(&nn).sqrt();

    let row_variance = variance(&occupancy_counts(points, |p| p.y));
    let column_variance = variance(&occupancy_counts(points, |p| p.x));

    let sizes = cluster_sizes(points);
    let cluster_count = sizes.len();
    let mean_cluster_size = mean(&sizes.iter().map(|&s| s as f64).collect::<Vec<_>>());
    let max_cluster_size = sizes.iter().copied().max().unwrap_or(0);

    let bounding_box_density = if coverage_area > 0 {
        n / coverage_area as f64
    } else {
        0.0
    };

    let center_of_mass_x = points.iter().map(|p| f64::from(p.x)).sum::<f64>() / n;
    let center_of_mass_y = points.iter().map(|p| f64::from(p.y)).sum::<f64>() / n;

    let radial_symmetry_score = radial_symmetry(points, grid_size);

    FeatureVector {
        n_points,
        adjacency_rate: round3(adjacency_rate),
        singleton_ratio: round3(singleton_ratio),
        mean_nn_distance: round3(mean_nn_distance),
        std_nn_distance: round3(std_nn_distance),
        row_variance: round3(row_variance),
        column_variance: round3(column_variance),
        cluster_count,
        mean_cluster_size: round3(mean_cluster_size),
        max_cluster_size,
        bounding_box_density: round3(bounding_box_density),
        radial_symmetry_score: round3(radial_symmetry_score),
        center_of_mass_x: round3(center_of_mass_x),
        center_of_mass_y: round3(center_of_mass_y),
        width,
        height,
        coverage_area,
        min_x,
        max_x,
        min_y,
        max_y,
    }
}

/// Sizes of the 8-connected components, in discovery order
///
/// Uses an explicit stack rather than recursion so depth stays bounded at the
/// 1024-point cap.
pub fn cluster_sizes(points: &[Coordinate]) -> Vec<usize> {
    let mut visited = vec![false; points.len()];
    let mut sizes = Vec::new();
    let mut stack = Vec::new();

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }

        let mut size = 0;
        stack.push(start);

        while let Some(current) = stack.pop() {
            if visited[current] {
                continue;
            }
            visited[current] = true;
            size += 1;

            for (next, other) in points.iter().enumerate() {
                if !visited[next] && points[current].is_adjacent(other) {
                    stack.push(next);
                }
            }
        }

        sizes.push(size);
    }

    sizes
}

/// Round to three decimals (half away from zero; all inputs are non-negative)
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn count_with_neighbour(points: &[Coordinate]) -> usize {
    points
        .iter()
        .filter(|p| points.iter().any(|other| p.is_adjacent(other)))
        .count()
}

/// Minimum distance from each point to any other point; empty below 2 points
fn nearest_neighbour_distances(points: &[Coordinate]) -> Vec<f64> {
    if points.len() < 2 {
        return Vec::new();
    }

    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| p.distance(other))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Occupancy count per distinct key, in first-appearance order
fn occupancy_counts(points: &[Coordinate], key: impl Fn(&Coordinate) -> i32) -> Vec<f64> {
    let mut slot: HashMap<i32, usize> = HashMap::new();
    let mut counts: Vec<f64> = Vec::new();

    for p in points {
        let idx = *slot.entry(key(p)).or_insert_with(|| {
            counts.push(0.0);
            counts.len() - 1
        });
        counts[idx] += 1.0;
    }

    counts
}

fn radial_symmetry(points: &[Coordinate], grid_size: u32) -> f64 {
    let center = f64::from(grid_size) / 2.0 - 0.5;
    let distances: Vec<f64> = points
        .iter()
        .map(|p| {
            let dx = f64::from(p.x) - center;
            let dy = f64::from(p.y) - center;
            (dx * dx + dy * dy).sqrt()
        })
        .collect();

    1.0 / (1.0 + variance(&distances))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
