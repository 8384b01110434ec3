//! faceoff-td library - Tournament Director module
//!
//! Runs single-elimination tournaments seeded from four contestant
//! quadrants: bracket generation with crossover-correct pairing,
//! round/matchup progression, concurrent vote tallying, and tie-break
//! resolution through a fixed system identity.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod engine;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Service start time, reported by the health endpoint
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health::health_routes())
        .merge(api::tournaments::tournament_routes())
        .merge(api::bracket::bracket_routes())
        .merge(api::votes::vote_routes())
        .merge(api::tiebreak::tiebreak_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
