//! Bracket generation
//!
//! Builds round 1 from the four seeded quadrants. Slot positions are
//! assigned over the quadrant concatenation A, C, B, D; combined with
//! winner advancement (positions 2k-1 and 2k merge into position k)
//! this pairs A's winner against C's winner and B's against D's in
//! round 2, so contestants from A and B can only meet in the Final.

use crate::db;
use crate::engine::rounds;
use faceoff_common::db::models::{Contestant, Matchup, Quadrant, Round};
use faceoff_common::{Error, Result};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

/// Round 1 plus its matchups, as constructed by the generator
#[derive(Debug, Clone)]
pub struct GeneratedRound {
    pub round: Round,
    pub matchups: Vec<Matchup>,
}

/// Validate the contestant pool for generation.
///
/// Requires exactly 4 non-empty quadrants of equal size, at least 4
/// contestants total, and contiguous seeds 1..=n in each quadrant.
/// Returns the per-quadrant size.
pub fn validate_pool(pool: &BTreeMap<Quadrant, Vec<Contestant>>) -> Result<usize> {
    let mut size: Option<usize> = None;

    for quadrant in [Quadrant::A, Quadrant::B, Quadrant::C, Quadrant::D] {
        let contestants = pool
            .get(&quadrant)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Validation(format!("quadrant {} has no contestants", quadrant)))?;

        match size {
            None => size = Some(contestants.len()),
            Some(expected) if contestants.len() != expected => {
                return Err(Error::Validation(format!(
                    "quadrant sizes differ: quadrant {} has {}, expected {}",
                    quadrant,
                    contestants.len(),
                    expected
                )));
            }
            Some(_) => {}
        }

        for (index, contestant) in contestants.iter().enumerate() {
            let expected_seed = index as i64 + 1;
            if contestant.seed != expected_seed {
                return Err(Error::Validation(format!(
                    "quadrant {} is missing seed {}",
                    quadrant, expected_seed
                )));
            }
        }
    }

    let per_quadrant = size.unwrap_or(0);
    if per_quadrant * 4 < 4 {
        return Err(Error::Validation(
            "tournament requires at least 4 contestants".to_string(),
        ));
    }

    Ok(per_quadrant)
}

/// Build round 1 with crossover-correct slot positions.
///
/// Within each quadrant, seed i plays seed (n - i + 1). When n is odd
/// the middle seed self-pairs and advances on a bye. Nothing is
/// persisted here; a validation failure commits nothing.
pub fn build_round_one(
    tournament_id: Uuid,
    pool: &BTreeMap<Quadrant, Vec<Contestant>>,
) -> Result<GeneratedRound> {
    validate_pool(pool)?;

    let round = Round::new(tournament_id, 1);
    let mut matchups = Vec::new();
    let mut position: i64 = 1;

    for quadrant in Quadrant::CROSSOVER_ORDER {
        let contestants = &pool[&quadrant];
        let n = contestants.len();

        for i in 1..=n.div_ceil(2) {
            let j = n - i + 1;
            let matchup = if i < j {
                Matchup::new_pair(
                    round.guid,
                    position,
                    contestants[i - 1].guid,
                    contestants[j - 1].guid,
                )
            } else {
                // odd quadrant size: the middle seed has no opponent
                Matchup::new_bye(round.guid, position, contestants[i - 1].guid)
            };
            matchups.push(matchup);
            position += 1;
        }
    }

    Ok(GeneratedRound { round, matchups })
}

/// Generate and persist round 1 for a tournament.
///
/// The round, its matchups, and the contestant-pool freeze are written
/// in one transaction; a failure anywhere commits no partial bracket.
/// The new round is activated immediately since all its slots are
/// populated by construction.
pub async fn generate_bracket(pool: &SqlitePool, tournament_id: Uuid) -> Result<GeneratedRound> {
    let tournament = db::tournaments::load_tournament(pool, tournament_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("tournament {}", tournament_id)))?;

    if tournament.bracket_generated {
        return Err(Error::InvalidState(format!(
            "tournament {} already has a bracket",
            tournament_id
        )));
    }

    let quadrants = db::contestants::load_quadrant_contestants(pool, tournament_id).await?;
    let generated = build_round_one(tournament_id, &quadrants)?;

    let mut tx = pool.begin().await?;
    db::rounds::insert_round(&mut *tx, &generated.round).await?;
    for matchup in &generated.matchups {
        db::matchups::insert_matchup(&mut *tx, matchup).await?;
    }
    db::tournaments::set_bracket_generated(&mut *tx, tournament_id).await?;
    tx.commit().await?;

    info!(
        "Generated bracket for tournament {}: {} round-1 matchups",
        tournament_id,
        generated.matchups.len()
    );

    rounds::activate_round(pool, generated.round.guid).await?;

    Ok(generated)
}
