//! Tie-break resolution endpoints

use crate::engine::tiebreak;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use faceoff_common::api::types::MatchupView;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GET /api/tournaments/:id/tied-matchups
///
/// Matchups whose regular tally is deadlocked and that no tie-break
/// vote has reached yet.
pub async fn list_tied_matchups(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<MatchupView>>> {
    let tied = tiebreak::list_tied_matchups(&state.db, id).await?;
    Ok(Json(tied.iter().map(MatchupView::from).collect()))
}

/// Request payload for resolving a tied matchup
#[derive(Debug, Deserialize)]
pub struct CastTieBreakRequest {
    pub contestant_id: Uuid,
    /// Administrator triggering the resolution; recorded in the log,
    /// never as the vote owner
    pub admin_id: Uuid,
}

/// Response payload after a tie-break resolves a matchup
#[derive(Debug, Serialize)]
pub struct CastTieBreakResponse {
    pub success: bool,
    pub winner_id: Uuid,
}

/// POST /api/matchups/:id/tie-break
pub async fn cast_tie_break(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CastTieBreakRequest>,
) -> ApiResult<Json<CastTieBreakResponse>> {
    tiebreak::cast_tie_break(&state.db, id, payload.contestant_id, payload.admin_id).await?;

    Ok(Json(CastTieBreakResponse {
        success: true,
        winner_id: payload.contestant_id,
    }))
}

/// Build tie-break routes
pub fn tiebreak_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tournaments/:id/tied-matchups", get(list_tied_matchups))
        .route("/api/matchups/:id/tie-break", post(cast_tie_break))
}
