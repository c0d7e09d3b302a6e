//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;
use crate::pattern::Coordinate;

/// Label stored on every submission
pub const LABEL_HUMAN: &str = "human";

/// One accepted pattern with its derived features
///
/// Append-only. Carries no contributor identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    pub points: Vec<Coordinate>,
    pub label: String,
    /// e.g. "32x32"
    pub grid_size: String,
    pub features: FeatureVector,
    /// "YYYY-MM" at creation time, never recomputed
    pub timestamp_bucket: String,
    pub opted_in_for_credit: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-identity contribution counter
///
/// The only place identity is stored. Holds no submission reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub username: String,
    pub contribution_count: i64,
    pub opted_out: bool,
    pub updated_at: DateTime<Utc>,
}

/// Public leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub identity: String,
    pub contribution_count: i64,
}

/// Aggregate counts shown alongside the leaderboard
///
/// Field names go out in snake_case, unlike [`LeaderboardEntry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStats {
    pub total_submissions: i64,
    pub total_contributors: i64,
    pub recent_submissions: i64,
}

/// Administrative monitoring view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_submissions: i64,
    pub total_contributors: i64,
    pub database_size_kb: i64,
    pub oldest_submission: Option<DateTime<Utc>>,
    pub newest_submission: Option<DateTime<Utc>>,
}

/// Grid size text stored on each record (e.g. 32 -> "32x32")
pub fn grid_size_label(grid_size: u32) -> String {
    format!("{}x{}", grid_size, grid_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_label() {
        assert_eq!(grid_size_label(32), "32x32");
        assert_eq!(grid_size_label(8), "8x8");
    }

    #[test]
    fn test_leaderboard_entry_wire_names() {
        let entry = LeaderboardEntry {
            identity: "alice".to_string(),
            contribution_count: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["identity"], "alice");
        assert_eq!(json["contributionCount"], 3);
    }

    #[test]
    fn test_stats_wire_names_are_snake_case() {
        let totals = TotalStats {
            total_submissions: 1,
            total_contributors: 2,
            recent_submissions: 1,
        };
        let json = serde_json::to_value(totals).unwrap();
        assert_eq!(json["total_submissions"], 1);
        assert_eq!(json["total_contributors"], 2);
        assert_eq!(json["recent_submissions"], 1);
        assert!(json.get("totalSubmissions").is_none());

        let json = serde_json::to_value(DatabaseStats::default()).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "database_size_kb",
                "newest_submission",
                "oldest_submission",
                "total_contributors",
                "total_submissions",
            ]
        );
    }
}
