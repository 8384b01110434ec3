//! Common error types for Faceoff

use thiserror::Error;

/// Common result type for Faceoff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Faceoff services
///
/// Voting and tie-break failures are recoverable and surfaced to the
/// caller; `InvalidState` on a round transition indicates a caller bug.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed identifier in a stored row or request
    #[error("Invalid identifier: {0}")]
    Uuid(#[from] uuid::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bracket generation input rejected; nothing was committed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation not permitted in the entity's current status
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Chosen contestant is not part of the matchup
    #[error("Invalid choice: {0}")]
    InvalidChoice(String),

    /// A vote already exists for this (voter, matchup, kind)
    #[error("Duplicate vote: {0}")]
    DuplicateVote(String),

    /// Tie-break requested on a matchup that is not tied
    #[error("Not tied: {0}")]
    NotTied(String),

    /// Matchup already carries a tie-break vote or a decided winner
    #[error("Already resolved: {0}")]
    AlreadyResolved(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
