//! Public leaderboard endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use dotgrid_common::db::models::{LeaderboardEntry, TotalStats};
use dotgrid_common::time;
use serde::{Deserialize, Serialize};

use crate::db::{ledger, stats};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub data: LeaderboardData,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardData {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub stats: TotalStats,
}

/// GET /api/leaderboard?limit=N
pub async fn leaderboard(
    State(state): State<AppState>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> ApiResult<Json<LeaderboardResponse>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (leaderboard, stats) = tokio::try_join!(
        ledger::get_leaderboard(&state.db, query.limit),
        stats::get_total_stats(&state.db, time::now()),
    )?;

    Ok(Json(LeaderboardResponse {
        success: true,
        data: LeaderboardData { leaderboard, stats },
    }))
}
