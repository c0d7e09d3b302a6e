//! Administrative endpoints: database statistics and reset
//!
//! Every route here requires the configured admin token in the
//! `x-admin-token` header. With no token configured they always answer 403.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use dotgrid_common::db::models::DatabaseStats;
use dotgrid_common::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{reset, stats};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Confirmation action accepted by the reset endpoint
pub const RESET_ACTION: &str = "reset";

/// Admin authorization middleware
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        warn!("Admin request refused: no admin token configured");
        return Err(ApiError::Forbidden);
    };

    let authorized = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token_matches(token, expected));

    if !authorized {
        warn!("Admin request refused: bad or missing token");
        return Err(ApiError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Compare without short-circuiting on the first differing byte
fn token_matches(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub success: bool,
    pub stats: DatabaseStats,
}

/// GET /api/admin/database
pub async fn admin_stats(State(state): State<AppState>) -> ApiResult<Json<AdminStatsResponse>> {
    let stats = stats::get_database_stats(&state.db).await?;
    Ok(Json(AdminStatsResponse {
        success: true,
        stats,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AdminActionRequest {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct AdminActionResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/admin/database with `{"action": "reset"}`
pub async fn admin_action(
    State(state): State<AppState>,
    payload: Result<Json<AdminActionRequest>, JsonRejection>,
) -> ApiResult<Json<AdminActionResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if request.action != RESET_ACTION {
        return Err(dotgrid_common::Error::from(ValidationError::UnsupportedAction {
            action: request.action,
        })
        .into());
    }

    info!("Admin reset requested");
    reset::reset_all(&state.db).await?;

    Ok(Json(AdminActionResponse {
        success: true,
        message: "Database reset successfully. All data has been deleted.".to_string(),
    }))
}
