//! Bracket generation and bracket view endpoints
//!
//! The view is the outward read contract: rounds ascending by
//! round_number, matchups ascending by position, with regular-vote
//! aggregates and the tie flag attached.

use crate::engine::{generator, rounds};
use crate::{db, ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use faceoff_common::api::types::{BracketData, MatchupView, RoundView, TournamentView};
use serde::Serialize;
use uuid::Uuid;

/// Response payload for bracket generation
#[derive(Debug, Serialize)]
pub struct GenerateBracketResponse {
    pub round_guid: Uuid,
    pub matchup_count: usize,
}

/// POST /api/tournaments/:id/bracket
///
/// Runs bracket generation over the stored contestant pool. A
/// validation failure commits nothing.
pub async fn generate_bracket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GenerateBracketResponse>> {
    let generated = generator::generate_bracket(&state.db, id).await?;

    Ok(Json(GenerateBracketResponse {
        round_guid: generated.round.guid,
        matchup_count: generated.matchups.len(),
    }))
}

/// GET /api/tournaments/:id/bracket
pub async fn get_bracket_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BracketData>> {
    let tournament = db::tournaments::load_tournament(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tournament {}", id)))?;

    let stored_rounds = db::rounds::load_rounds(&state.db, id).await?;

    // Round names depend on how deep the bracket will go, which is
    // fixed by the round-1 matchup count
    let total_rounds = match stored_rounds.first() {
        Some(first) => {
            let matchups = db::matchups::load_round_matchups(&state.db, first.guid).await?;
            rounds::total_rounds_for(matchups.len() as i64)
        }
        None => 0,
    };

    let mut round_views = Vec::with_capacity(stored_rounds.len());
    for round in &stored_rounds {
        let matchups = db::matchups::load_round_matchups(&state.db, round.guid).await?;
        round_views.push(RoundView {
            round_number: round.round_number,
            name: rounds::round_name(round.round_number, total_rounds),
            status: round.status,
            matchups: matchups.iter().map(MatchupView::from).collect(),
        });
    }

    Ok(Json(BracketData {
        tournament: TournamentView {
            guid: tournament.guid,
            name: tournament.name,
            bracket_generated: tournament.bracket_generated,
            champion_id: tournament.champion_id,
        },
        rounds: round_views,
    }))
}

/// Build bracket routes
pub fn bracket_routes() -> Router<AppState> {
    Router::new().route(
        "/api/tournaments/:id/bracket",
        get(get_bracket_data).post(generate_bracket),
    )
}
