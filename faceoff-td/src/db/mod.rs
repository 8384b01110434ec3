//! Database operations for faceoff-td
//!
//! Thin persistence layer over the shared schema. Status transitions
//! that arbitrate races (matchup close, round close) are expressed as
//! conditional UPDATEs so the database decides the single winner.

pub mod contestants;
pub mod matchups;
pub mod rounds;
pub mod tournaments;
pub mod votes;
