//! Round and matchup state machine
//!
//! Round: Pending -> Active -> Completed (terminal).
//! Matchup: Pending -> Active -> Completed (terminal).
//!
//! A matchup closes through a compare-and-set, so two callers racing
//! to close it (a winning vote landing at the same moment as a
//! tie-break) resolve to exactly one close; the loser sees
//! AlreadyResolved. Closing the last matchup of a round completes the
//! round, and the round's own Active -> Completed CAS gates winner
//! propagation to at most once.

use crate::db;
use faceoff_common::db::models::{Matchup, MatchupStatus, Round, RoundStatus};
use faceoff_common::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Display name for a round, derived from its distance to the Final
pub fn round_name(round_number: i64, total_rounds: i64) -> String {
    match total_rounds - round_number {
        0 => "Final".to_string(),
        1 => "Semifinals".to_string(),
        2 => "Quarterfinals".to_string(),
        _ => format!("Round {}", round_number),
    }
}

/// Number of rounds a bracket starting with this many matchups will
/// play before one winner remains
pub fn total_rounds_for(first_round_matchups: i64) -> i64 {
    let mut remaining = first_round_matchups.max(1);
    let mut rounds = 1;
    while remaining > 1 {
        remaining = (remaining + 1) / 2;
        rounds += 1;
    }
    rounds
}

/// Activate a Pending round whose matchups are all populated.
///
/// Pair matchups become Active; bye matchups were created Completed
/// and are left alone. A round consisting entirely of byes completes
/// immediately and propagates.
pub async fn activate_round(pool: &SqlitePool, round_id: Uuid) -> Result<()> {
    let round = db::rounds::load_round(pool, round_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("round {}", round_id)))?;

    if round.status != RoundStatus::Pending {
        return Err(Error::InvalidState(format!(
            "round {} is {}, not pending",
            round_id,
            round.status.as_str()
        )));
    }

    let matchups = db::matchups::load_round_matchups(pool, round_id).await?;
    if matchups.is_empty() || !matchups.iter().all(Matchup::is_populated) {
        return Err(Error::InvalidState(format!(
            "round {} has unpopulated matchups",
            round_id
        )));
    }

    if !db::rounds::transition_round(pool, round_id, RoundStatus::Pending, RoundStatus::Active)
        .await?
    {
        // concurrent caller activated it first
        return Ok(());
    }
    db::matchups::activate_pending_matchups(pool, round_id).await?;

    advance_if_complete(pool, round_id).await
}

/// Close an Active matchup with the given winner and advance the
/// round if it thereby completes.
///
/// The winner must occupy one of the matchup's slots. A concurrent
/// close loses the CAS and surfaces as AlreadyResolved.
pub async fn close_matchup(pool: &SqlitePool, matchup_id: Uuid, winner_id: Uuid) -> Result<()> {
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
            if !matchup.involves(winner_id) {
                return Err(Error::InvalidChoice(format!(
                    "contestant {} is not part of matchup {}",
                    winner_id, matchup_id
                )));
            }
            if !db::matchups::complete_matchup(pool, matchup_id, winner_id).await? {
                return Err(Error::AlreadyResolved(format!(
                    "matchup {} was decided concurrently",
                    matchup_id
                )));
            }
            advance_if_complete(pool, matchup.round_id).await
        }
    }
}

/// Explicitly close an Active round.
///
/// Calling this while any matchup is still open is a caller bug and
/// fails with InvalidState; it is never silently ignored.
pub async fn complete_round(pool: &SqlitePool, round_id: Uuid) -> Result<()> {
    let round = db::rounds::load_round(pool, round_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("round {}", round_id)))?;

    if round.status != RoundStatus::Active {
        return Err(Error::InvalidState(format!(
            "round {} is {}, not active",
            round_id,
            round.status.as_str()
        )));
    }

    let open = db::matchups::count_incomplete(pool, round_id).await?;
    if open > 0 {
        return Err(Error::InvalidState(format!(
            "cannot close round {}: {} matchups still open",
            round_id, open
        )));
    }

    advance_rounds(pool, round_id).await
}

/// Complete the round and propagate winners if every matchup is
/// Completed; quietly does nothing otherwise.
pub(crate) async fn advance_if_complete(pool: &SqlitePool, round_id: Uuid) -> Result<()> {
    if db::matchups::count_incomplete(pool, round_id).await? > 0 {
        return Ok(());
    }
    advance_rounds(pool, round_id).await
}

/// Winner propagation.
///
/// Matchups at positions (2k-1, 2k) of the completed round populate
/// position k of the next round. An odd trailing matchup's winner
/// advances on a bye. If the completed round is the Final, the sole
/// winner becomes champion and no further round is created.
///
/// The Active -> Completed CAS on the round guarantees only one caller
/// runs this per round. Loops instead of recursing so that a freshly
/// created round that is somehow complete at birth advances too.
async fn advance_rounds(pool: &SqlitePool, start_round_id: Uuid) -> Result<()> {
    let mut round_id = start_round_id;

    loop {
        if !db::rounds::transition_round(pool, round_id, RoundStatus::Active, RoundStatus::Completed)
            .await?
        {
            // another caller owns propagation for this round
            return Ok(());
        }

        let round = db::rounds::load_round(pool, round_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("round {}", round_id)))?;
        let matchups = db::matchups::load_round_matchups(pool, round_id).await?;

        let winners: Vec<Uuid> = matchups
            .iter()
            .map(|m| {
                m.winner_id.ok_or_else(|| {
                    Error::Internal(format!("completed matchup {} has no winner", m.guid))
                })
            })
            .collect::<Result<_>>()?;

        if winners.len() == 1 {
            db::tournaments::set_champion(pool, round.tournament_id, winners[0]).await?;
            info!(
                "Tournament {} complete: champion {}",
                round.tournament_id, winners[0]
            );
            return Ok(());
        }

        let next_round = Round::new(round.tournament_id, round.round_number + 1);
        let mut next_matchups = Vec::with_capacity(winners.len().div_ceil(2));
        for (index, pair) in winners.chunks(2).enumerate() {
            let position = index as i64 + 1;
            let matchup = match pair {
                [first, second] => Matchup::new_pair(next_round.guid, position, *first, *second),
                [lone] => Matchup::new_bye(next_round.guid, position, *lone),
                _ => unreachable!("chunks(2) yields 1 or 2 winners"),
            };
            next_matchups.push(matchup);
        }

        let mut tx = pool.begin().await?;
        db::rounds::insert_round(&mut *tx, &next_round).await?;
        for matchup in &next_matchups {
            db::matchups::insert_matchup(&mut *tx, matchup).await?;
        }
        tx.commit().await?;

        info!(
            "Round {} of tournament {} complete; created round {} with {} matchups",
            round.round_number,
            round.tournament_id,
            next_round.round_number,
            next_matchups.len()
        );

        // The new round is fully populated by construction
        db::rounds::transition_round(pool, next_round.guid, RoundStatus::Pending, RoundStatus::Active)
            .await?;
        db::matchups::activate_pending_matchups(pool, next_round.guid).await?;

        if db::matchups::count_incomplete(pool, next_round.guid).await? > 0 {
            return Ok(());
        }
        round_id = next_round.guid;
    }
}
