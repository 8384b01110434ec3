//! HTTP API handlers

pub mod bracket;
pub mod health;
pub mod tiebreak;
pub mod tournaments;
pub mod votes;
