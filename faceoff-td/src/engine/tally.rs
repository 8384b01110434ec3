//! Vote recording and winner determination
//!
//! The tally is a pure aggregate over the stored vote set: counting,
//! not sequence-dependent, so recomputation after any interleaving of
//! concurrent voters yields the same result. The uniqueness of
//! (voter, matchup, kind) is enforced by the votes table index at
//! insert time.
//!
//! Votes accumulate while a matchup is Active; nothing closes on an
//! ordinary tally change, since the voting window is owned by the
//! scheduling layer outside this service. Winner determination runs
//! when resolution is requested, and again on any tally change of a
//! matchup already flagged as tied - a late vote that breaks the
//! deadlock closes it, racing a concurrent tie-break through the
//! status compare-and-set.

use crate::db;
use crate::engine::rounds;
use faceoff_common::db::models::{Matchup, MatchupStatus, Vote, VoteKind};
use faceoff_common::{Error, Result, TIE_BREAK_ACTOR_ID};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// Record a vote on an Active matchup.
///
/// Fails with InvalidState if the matchup is not accepting votes,
/// InvalidChoice if the contestant is not in the matchup, and
/// DuplicateVote if this (voter, matchup, kind) already voted. A
/// successful regular vote refreshes the stored aggregates.
pub async fn record_vote(
    pool: &SqlitePool,
    voter_id: Uuid,
    matchup_id: Uuid,
    contestant_id: Uuid,
    kind: VoteKind,
) -> Result<Vote> {
    let matchup = db::matchups::load_matchup(pool, matchup_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("matchup {}", matchup_id)))?;

    if matchup.status != MatchupStatus::Active {
        return Err(Error::InvalidState(format!(
            "matchup {} is {} and not accepting votes",
            matchup_id,
            matchup.status.as_str()
        )));
    }
    if !matchup.involves(contestant_id) {
        return Err(Error::InvalidChoice(format!(
            "contestant {} is not part of matchup {}",
            contestant_id, matchup_id
        )));
    }
    if kind == VoteKind::TieBreak && voter_id != TIE_BREAK_ACTOR_ID {
        // Tie-break votes belong to the fixed actor; an admin's own id
        // would collide with their personal regular vote key space
        return Err(Error::Validation(
            "tie-break votes are owned by the tie-break actor".to_string(),
        ));
    }

    let vote = Vote::new(voter_id, matchup_id, contestant_id, kind);
    db::votes::insert_vote(pool, &vote).await?;
    debug!(
        "Vote recorded: voter {} chose {} on matchup {} ({})",
        voter_id,
        contestant_id,
        matchup_id,
        kind.as_str()
    );

    if kind == VoteKind::Regular {
        refresh_tally(pool, &matchup).await?;
        // A matchup flagged as tied is in its resolution stage: a
        // vote that breaks the deadlock decides it
        if matchup.is_tie {
            evaluate_matchup(pool, matchup_id).await?;
        }
    }

    Ok(vote)
}

/// Recompute the stored aggregates from the vote set
async fn refresh_tally(pool: &SqlitePool, matchup: &Matchup) -> Result<(i64, i64)> {
    let contestant1_votes = match matchup.contestant1_id {
        Some(id) => db::votes::count_regular_votes(pool, matchup.guid, id).await?,
        None => 0,
    };
    let contestant2_votes = match matchup.contestant2_id {
        Some(id) => db::votes::count_regular_votes(pool, matchup.guid, id).await?,
        None => 0,
    };

    db::matchups::update_vote_counts(pool, matchup.guid, contestant1_votes, contestant2_votes)
        .await?;

    Ok((contestant1_votes, contestant2_votes))
}

/// Winner determination over the current tally.
///
/// Unequal counts close the matchup for the leader. Equal counts -
/// zero included - flag the matchup as tied and leave it Active for
/// the tie-break path; no winner is ever picked by default ordering.
/// Returns the winner when this call closed the matchup.
pub async fn evaluate_matchup(pool: &SqlitePool, matchup_id: Uuid) -> Result<Option<Uuid>> {
    let matchup = db::matchups::load_matchup(pool, matchup_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("matchup {}", matchup_id)))?;

    if matchup.status != MatchupStatus::Active {
        return Ok(None);
    }

    if matchup.contestant1_votes == matchup.contestant2_votes {
        db::matchups::mark_tie(pool, matchup_id).await?;
        return Ok(None);
    }

    let winner = if matchup.contestant1_votes > matchup.contestant2_votes {
        matchup.contestant1_id
    } else {
        matchup.contestant2_id
    }
    .ok_or_else(|| Error::Internal(format!("active matchup {} has an empty slot", matchup_id)))?;

    match rounds::close_matchup(pool, matchup_id, winner).await {
        Ok(()) => Ok(Some(winner)),
        // lost the close race; the concurrent closer owns the outcome
        Err(Error::AlreadyResolved(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Explicit resolution request for a matchup whose voting window the
/// surrounding scheduler has closed.
///
/// Recomputes the tally and runs winner determination; an equal tally
/// (including no votes at all) flags the matchup tied so an
/// administrator must resolve it.
pub async fn request_resolution(pool: &SqlitePool, matchup_id: Uuid) -> Result<Option<Uuid>> {
    let matchup = db::matchups::load_matchup(pool, matchup_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("matchup {}", matchup_id)))?;

    match matchup.status {
        MatchupStatus::Pending => Err(Error::InvalidState(format!(
            "matchup {} has not been activated",
            matchup_id
        ))),
        MatchupStatus::Completed => Err(Error::AlreadyResolved(format!(
            "matchup {} is already decided",
            matchup_id
        ))),
        MatchupStatus::Active => {
            refresh_tally(pool, &matchup).await?;
            evaluate_matchup(pool, matchup_id).await
        }
    }
}
