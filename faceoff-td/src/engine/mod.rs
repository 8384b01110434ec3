//! Tournament engine
//!
//! Bracket generation, round progression, vote tallying, and tie-break
//! resolution. Pure pairing logic is synchronous; everything touching
//! matchup or round status goes through conditional UPDATEs so that
//! concurrent callers are arbitrated at the storage boundary.

pub mod generator;
pub mod rounds;
pub mod tally;
pub mod tiebreak;
