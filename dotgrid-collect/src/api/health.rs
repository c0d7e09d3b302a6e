//! Liveness probe

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Cells per side that submissions are validated against
    pub grid_size: u32,
    /// Whether `/api/admin/*` can accept any request at all
    pub admin_enabled: bool,
}

/// GET /health
///
/// Answers from state only; a locked or missing database does not fail it.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        grid_size: state.ingest.grid_size(),
        admin_enabled: state.admin_token.is_some(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
