//! Tournament setup endpoints
//!
//! Tournaments and contestants are created here during setup; the
//! contestant pool freezes once the bracket is generated.

use crate::{db, ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use faceoff_common::db::models::{Contestant, Quadrant, Tournament};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Request payload for creating a tournament
#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
}

/// Response payload carrying a created entity's id
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub guid: Uuid,
}

/// POST /api/tournaments
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(payload): Json<CreateTournamentRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("tournament name cannot be empty".to_string()));
    }

    let tournament = Tournament::new(payload.name.trim().to_string());
    db::tournaments::insert_tournament(&state.db, &tournament).await?;

    info!("Created tournament {} ({})", tournament.name, tournament.guid);
    Ok(Json(CreatedResponse { guid: tournament.guid }))
}

/// Tournament summary with champion once decided
#[derive(Debug, Serialize)]
pub struct TournamentResponse {
    pub guid: Uuid,
    pub name: String,
    pub bracket_generated: bool,
    pub champion_id: Option<Uuid>,
}

/// GET /api/tournaments/:id
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TournamentResponse>> {
    let tournament = db::tournaments::load_tournament(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tournament {}", id)))?;

    Ok(Json(TournamentResponse {
        guid: tournament.guid,
        name: tournament.name,
        bracket_generated: tournament.bracket_generated,
        champion_id: tournament.champion_id,
    }))
}

/// Request payload for registering a contestant
#[derive(Debug, Deserialize)]
pub struct AddContestantRequest {
    pub name: String,
    /// One of "A", "B", "C", "D"
    pub quadrant: String,
    /// Rank within the quadrant, 1 = strongest
    pub seed: i64,
}

/// POST /api/tournaments/:id/contestants
pub async fn add_contestant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddContestantRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let tournament = db::tournaments::load_tournament(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tournament {}", id)))?;

    // Contestants are immutable once the bracket exists
    if tournament.bracket_generated {
        return Err(ApiError::Conflict(format!(
            "tournament {} already has a bracket; contestants are frozen",
            id
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("contestant name cannot be empty".to_string()));
    }
    if payload.seed < 1 {
        return Err(ApiError::BadRequest("seed must be 1 or greater".to_string()));
    }
    let quadrant: Quadrant = payload.quadrant.parse()?;

    let contestant = Contestant::new(id, payload.name.trim().to_string(), quadrant, payload.seed);
    db::contestants::insert_contestant(&state.db, &contestant).await?;

    Ok(Json(CreatedResponse { guid: contestant.guid }))
}

/// Build tournament setup routes
pub fn tournament_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tournaments", post(create_tournament))
        .route("/api/tournaments/:id", get(get_tournament))
        .route("/api/tournaments/:id/contestants", post(add_contestant))
}
