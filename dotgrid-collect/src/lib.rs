//! dotgrid-collect library - pattern collection service
//!
//! Accepts human-drawn dot patterns, stores them anonymously with their
//! extracted features, keeps a separate per-contributor ledger, and serves
//! leaderboard and admin views.

use axum::Router;
use dotgrid_common::config::{Settings, DEFAULT_MAX_BODY_BYTES};
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod api;
pub mod db;
pub mod error;
pub mod ingest;

pub use crate::error::{ApiError, ApiResult};
pub use crate::ingest::{Contributor, IngestionCoordinator, SubmitOutcome};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Validation, extraction, and persistence of submissions
    pub ingest: IngestionCoordinator,
    /// Token expected in `x-admin-token`; admin routes refuse all requests when unset
    pub admin_token: Option<Arc<str>>,
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, grid_size: u32, admin_token: Option<String>) -> Self {
        Self {
            ingest: IngestionCoordinator::new(db.clone(), grid_size),
            db,
            admin_token: admin_token.map(Arc::from),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Create application state from resolved settings
    pub fn from_settings(db: SqlitePool, settings: &Settings) -> Self {
        let mut state = Self::new(db, settings.grid_size, settings.admin_token.clone());
        state.max_body_bytes = settings.max_body_bytes;
        state
    }
}

/// Build application router
///
/// Admin routes sit behind the admin-token middleware; everything else is
/// public (authentication, CAPTCHA, and rate limiting belong to the fronting
/// layer).
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::limit::RequestBodyLimitLayer;
    use tower_http::trace::TraceLayer;

    let admin = Router::new()
        .route(
            "/api/admin/database",
            get(api::admin_stats).post(api::admin_action),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_admin,
        ));

    let public = Router::new()
        .route("/api/submit-pattern", post(api::submit_pattern))
        .route("/api/leaderboard", get(api::leaderboard))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(RequestBodyLimitLayer::new(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
