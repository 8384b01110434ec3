//! Voting endpoints

use crate::engine::tally;
use crate::{db, ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use faceoff_common::db::models::{MatchupStatus, VoteKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request payload for casting a regular vote
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub voter_id: Uuid,
    pub contestant_id: Uuid,
}

/// Response payload after a vote lands
#[derive(Debug, Serialize)]
pub struct CastVoteResponse {
    pub vote_guid: Uuid,
    /// Matchup status after the vote; a vote that breaks a flagged
    /// tie closes the matchup
    pub matchup_status: MatchupStatus,
    pub winner_id: Option<Uuid>,
    pub is_tie: bool,
}

/// POST /api/matchups/:id/votes
///
/// Duplicate votes, votes on non-active matchups, and votes for
/// contestants outside the matchup are rejected with distinct error
/// codes; none of them disturb the stored tally.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> ApiResult<Json<CastVoteResponse>> {
    let vote = tally::record_vote(
        &state.db,
        payload.voter_id,
        id,
        payload.contestant_id,
        VoteKind::Regular,
    )
    .await?;

    let matchup = db::matchups::load_matchup(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("matchup {}", id)))?;

    Ok(Json(CastVoteResponse {
        vote_guid: vote.guid,
        matchup_status: matchup.status,
        winner_id: matchup.winner_id,
        is_tie: matchup.is_tie,
    }))
}

/// Response payload for an explicit resolution request
#[derive(Debug, Serialize)]
pub struct ResolutionResponse {
    pub winner_id: Option<Uuid>,
    /// True when the tally is deadlocked and awaits a tie-break
    pub is_tie: bool,
}

/// POST /api/matchups/:id/resolution
///
/// Called by the scheduling layer when a voting window closes. An
/// unequal tally closes the matchup; an equal one (zero votes
/// included) flags it tied for an administrator to resolve.
pub async fn request_resolution(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResolutionResponse>> {
    let winner = tally::request_resolution(&state.db, id).await?;

    let matchup = db::matchups::load_matchup(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("matchup {}", id)))?;

    Ok(Json(ResolutionResponse {
        winner_id: winner,
        is_tie: matchup.is_tie && matchup.status == MatchupStatus::Active,
    }))
}

/// Build voting routes
pub fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/api/matchups/:id/votes", post(cast_vote))
        .route("/api/matchups/:id/resolution", post(request_resolution))
}
