//! Shared API request/response types
//!
//! The bracket view is the outward-facing read contract: rounds
//! ordered by round_number ascending, matchups ordered by position
//! ascending, with vote aggregates attached.

use crate::db::models::{Matchup, MatchupStatus, RoundStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Full bracket snapshot for one tournament
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketData {
    pub tournament: TournamentView,
    pub rounds: Vec<RoundView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentView {
    pub guid: Uuid,
    pub name: String,
    pub bracket_generated: bool,
    /// Winner of the Final's single matchup, once it completes
    pub champion_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundView {
    pub round_number: i64,
    /// Display name derived from distance to the Final
    /// ("Final", "Semifinals", "Quarterfinals", else "Round N")
    pub name: String,
    pub status: RoundStatus,
    pub matchups: Vec<MatchupView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupView {
    pub guid: Uuid,
    pub position: i64,
    pub status: MatchupStatus,
    pub contestant1_id: Option<Uuid>,
    pub contestant2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub vote_counts: VoteCounts,
    pub is_tie: bool,
}

impl From<&Matchup> for MatchupView {
    fn from(matchup: &Matchup) -> Self {
        Self {
            guid: matchup.guid,
            position: matchup.position,
            status: matchup.status,
            contestant1_id: matchup.contestant1_id,
            contestant2_id: matchup.contestant2_id,
            winner_id: matchup.winner_id,
            vote_counts: VoteCounts::new(matchup.contestant1_votes, matchup.contestant2_votes),
            is_tie: matchup.is_tie,
        }
    }
}

/// Regular-vote aggregates; tie-break votes are never mixed in
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoteCounts {
    pub contestant1_votes: i64,
    pub contestant2_votes: i64,
    pub total_votes: i64,
}

impl VoteCounts {
    pub fn new(contestant1_votes: i64, contestant2_votes: i64) -> Self {
        Self {
            contestant1_votes,
            contestant2_votes,
            total_votes: contestant1_votes + contestant2_votes,
        }
    }
}
