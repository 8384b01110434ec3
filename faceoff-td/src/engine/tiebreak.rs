//! Tie-break resolution
//!
//! A tied matchup is finalized by a single tie-break vote recorded
//! under the fixed tie-break actor identity. The administrator who
//! triggers the resolution is only the trigger, never the vote owner,
//! so their personal regular vote on the same matchup stays valid.

use crate::db;
use crate::engine::rounds;
use faceoff_common::db::models::{Matchup, MatchupStatus, Vote, VoteKind};
use faceoff_common::{Error, Result, TIE_BREAK_ACTOR_ID};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// All matchups of a tournament flagged as tied with no tie-break
/// vote yet
pub async fn list_tied_matchups(pool: &SqlitePool, tournament_id: Uuid) -> Result<Vec<Matchup>> {
    let tournament = db::tournaments::load_tournament(pool, tournament_id).await?;
    if tournament.is_none() {
        return Err(Error::NotFound(format!("tournament {}", tournament_id)));
    }

    db::matchups::load_unresolved_ties(pool, tournament_id).await
}

/// Resolve a tied matchup in favor of the chosen contestant.
///
/// Fails with NotTied when the matchup is not flagged, AlreadyResolved
/// when a tie-break vote (or a concurrent close) got there first, and
/// InvalidChoice when the contestant is not in the matchup. On success
/// the vote is recorded under the tie-break actor, the matchup closes
/// with the chosen winner, and the round advances if it thereby
/// completes. The is_tie flag is left set as a historical marker.
pub async fn cast_tie_break(
    pool: &SqlitePool,
    matchup_id: Uuid,
    contestant_id: Uuid,
    requesting_admin_id: Uuid,
) -> Result<()> {
    let matchup = db::matchups::load_matchup(pool, matchup_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("matchup {}", matchup_id)))?;

    if !matchup.is_tie {
        return Err(Error::NotTied(format!(
            "matchup {} has no tied tally to break",
            matchup_id
        )));
    }
    if matchup.status == MatchupStatus::Completed
        || db::votes::has_tie_break_vote(pool, matchup_id).await?
    {
        return Err(Error::AlreadyResolved(format!(
            "matchup {} already has a resolution",
            matchup_id
        )));
    }
    if !matchup.involves(contestant_id) {
        return Err(Error::InvalidChoice(format!(
            "contestant {} is not part of matchup {}",
            contestant_id, matchup_id
        )));
    }

    // The vote belongs to the fixed actor, not the requesting admin
    let vote = Vote::new(TIE_BREAK_ACTOR_ID, matchup_id, contestant_id, VoteKind::TieBreak);
    match db::votes::insert_vote(pool, &vote).await {
        Ok(()) => {}
        // a concurrent tie-break or close landed between our check
        // and the guarded insert
        Err(Error::DuplicateVote(_)) | Err(Error::InvalidState(_)) => {
            return Err(Error::AlreadyResolved(format!(
                "matchup {} already has a resolution",
                matchup_id
            )));
        }
        Err(e) => return Err(e),
    }

    info!(
        "Tie-break on matchup {}: admin {} selected contestant {}",
        matchup_id, requesting_admin_id, contestant_id
    );

    rounds::close_matchup(pool, matchup_id, contestant_id).await
}
