//! Shared API types

pub mod types;

pub use types::{BracketData, MatchupView, RoundView, TournamentView, VoteCounts};
