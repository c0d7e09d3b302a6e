//! Pattern submission endpoint

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use dotgrid_common::RawCoordinate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::ingest::Contributor;
use crate::AppState;

/// POST /api/submit-pattern request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub coordinates: Vec<RawCoordinate>,

    #[serde(default = "default_opted_in")]
    pub opted_in_for_credit: bool,

    /// Identity already authenticated by the fronting layer
    #[serde(default)]
    pub contributor_identity: Option<String>,

    /// Count the contribution but keep the identity off the leaderboard
    #[serde(default)]
    pub leaderboard_opt_out: bool,
}

fn default_opted_in() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub points_submitted: usize,
}

/// POST /api/submit-pattern
///
/// Caller is responsible for authentication, CAPTCHA, and rate limiting
/// before this point.
pub async fn submit_pattern(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let contributor = request.contributor_identity.map(|identity| Contributor {
        identity,
        opted_out: request.leaderboard_opt_out,
    });

    let outcome = state
        .ingest
        .submit(
            &request.coordinates,
            request.opted_in_for_credit,
            contributor.as_ref(),
        )
        .await?;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Pattern submitted successfully!".to_string(),
        points_submitted: outcome.points_submitted,
    }))
}
