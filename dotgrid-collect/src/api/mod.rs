//! HTTP API handlers for dotgrid-collect

pub mod admin;
pub mod health;
pub mod leaderboard;
pub mod submit;

pub use admin::{admin_action, admin_stats, require_admin};
pub use health::health_routes;
pub use leaderboard::leaderboard;
pub use submit::submit_pattern;
