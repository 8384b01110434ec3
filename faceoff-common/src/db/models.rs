//! Database models

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fixed identity that owns every tie-break vote.
///
/// Tie-break votes are never attributed to the administrator who
/// triggered them. Routing them all through one well-known voter id
/// keeps an admin's personal vote and a tie-break on the same matchup
/// from colliding on the (voter, matchup, kind) uniqueness key.
pub const TIE_BREAK_ACTOR_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

/// One of the four seeded partitions of a tournament's contestants
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    A,
    B,
    C,
    D,
}

impl Quadrant {
    /// Quadrant concatenation order for round-1 slot assignment.
    ///
    /// Listing C second (not B) is what makes winner advancement merge
    /// A's winner with C's winner in round 2, and B's with D's, so
    /// that A and B can only meet in the Final. Concatenating in
    /// declared order A,B,C,D would silently pair A against B in the
    /// semifinal instead.
    pub const CROSSOVER_ORDER: [Quadrant; 4] = [Quadrant::A, Quadrant::C, Quadrant::B, Quadrant::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::A => "A",
            Quadrant::B => "B",
            Quadrant::C => "C",
            Quadrant::D => "D",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" => Ok(Quadrant::A),
            "B" | "b" => Ok(Quadrant::B),
            "C" | "c" => Ok(Quadrant::C),
            "D" | "d" => Ok(Quadrant::D),
            other => Err(Error::Validation(format!("unknown quadrant: {}", other))),
        }
    }
}

/// Round lifecycle status (Completed is terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    Pending,
    Active,
    Completed,
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Active => "active",
            RoundStatus::Completed => "completed",
        }
    }
}

impl FromStr for RoundStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(RoundStatus::Pending),
            "active" => Ok(RoundStatus::Active),
            "completed" => Ok(RoundStatus::Completed),
            other => Err(Error::Internal(format!("unknown round status: {}", other))),
        }
    }
}

/// Matchup lifecycle status (Completed is terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchupStatus {
    Pending,
    Active,
    Completed,
}

impl MatchupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchupStatus::Pending => "pending",
            MatchupStatus::Active => "active",
            MatchupStatus::Completed => "completed",
        }
    }
}

impl FromStr for MatchupStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(MatchupStatus::Pending),
            "active" => Ok(MatchupStatus::Active),
            "completed" => Ok(MatchupStatus::Completed),
            other => Err(Error::Internal(format!("unknown matchup status: {}", other))),
        }
    }
}

/// Vote kind; tie-break votes are tracked separately from the regular
/// tally and never counted into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteKind {
    Regular,
    TieBreak,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Regular => "regular",
            VoteKind::TieBreak => "tie_break",
        }
    }
}

impl FromStr for VoteKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regular" => Ok(VoteKind::Regular),
            "tie_break" => Ok(VoteKind::TieBreak),
            other => Err(Error::Internal(format!("unknown vote kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub guid: Uuid,
    pub name: String,
    pub bracket_generated: bool,
    pub champion_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: String) -> Self {
        Self {
            guid: Uuid::new_v4(),
            name,
            bracket_generated: false,
            champion_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Contestant record; immutable once the bracket is generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub guid: Uuid,
    pub tournament_id: Uuid,
    pub name: String,
    pub quadrant: Quadrant,
    /// Rank within the quadrant, 1 = strongest
    pub seed: i64,
}

impl Contestant {
    pub fn new(tournament_id: Uuid, name: String, quadrant: Quadrant, seed: i64) -> Self {
        Self {
            guid: Uuid::new_v4(),
            tournament_id,
            name,
            quadrant,
            seed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub guid: Uuid,
    pub tournament_id: Uuid,
    /// 1 = first round, strictly increasing with no gaps
    pub round_number: i64,
    pub status: RoundStatus,
}

impl Round {
    pub fn new(tournament_id: Uuid, round_number: i64) -> Self {
        Self {
            guid: Uuid::new_v4(),
            tournament_id,
            round_number,
            status: RoundStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matchup {
    pub guid: Uuid,
    pub round_id: Uuid,
    /// 1-based slot, unique within the round
    pub position: i64,
    pub contestant1_id: Option<Uuid>,
    pub contestant2_id: Option<Uuid>,
    pub winner_id: Option<Uuid>,
    pub status: MatchupStatus,
    /// Aggregate over regular-kind votes only
    pub contestant1_votes: i64,
    /// Aggregate over regular-kind votes only
    pub contestant2_votes: i64,
    /// Set when the regular tally deadlocks; stays set after a
    /// tie-break resolves the matchup, as a historical marker
    pub is_tie: bool,
}

impl Matchup {
    /// Matchup with two contestants, awaiting activation and votes
    pub fn new_pair(round_id: Uuid, position: i64, contestant1: Uuid, contestant2: Uuid) -> Self {
        Self {
            guid: Uuid::new_v4(),
            round_id,
            position,
            contestant1_id: Some(contestant1),
            contestant2_id: Some(contestant2),
            winner_id: None,
            status: MatchupStatus::Pending,
            contestant1_votes: 0,
            contestant2_votes: 0,
            is_tie: false,
        }
    }

    /// Bye matchup: a lone contestant advances without votes. Created
    /// already Completed and never activated.
    pub fn new_bye(round_id: Uuid, position: i64, contestant: Uuid) -> Self {
        Self {
            guid: Uuid::new_v4(),
            round_id,
            position,
            contestant1_id: Some(contestant),
            contestant2_id: None,
            winner_id: Some(contestant),
            status: MatchupStatus::Completed,
            contestant1_votes: 0,
            contestant2_votes: 0,
            is_tie: false,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.contestant1_id.is_some() != self.contestant2_id.is_some()
    }

    /// Whether the given contestant occupies one of the two slots
    pub fn involves(&self, contestant_id: Uuid) -> bool {
        self.contestant1_id == Some(contestant_id) || self.contestant2_id == Some(contestant_id)
    }

    /// Both slots populated, or a bye that is already decided
    pub fn is_populated(&self) -> bool {
        (self.contestant1_id.is_some() && self.contestant2_id.is_some())
            || (self.is_bye() && self.status == MatchupStatus::Completed)
    }
}

/// Immutable vote record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub guid: Uuid,
    pub voter_id: Uuid,
    pub matchup_id: Uuid,
    pub contestant_id: Uuid,
    pub kind: VoteKind,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(voter_id: Uuid, matchup_id: Uuid, contestant_id: Uuid, kind: VoteKind) -> Self {
        Self {
            guid: Uuid::new_v4(),
            voter_id,
            matchup_id,
            contestant_id,
            kind,
            created_at: Utc::now(),
        }
    }
}
