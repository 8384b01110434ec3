//! Vote database operations
//!
//! The uniqueness check-and-insert is a single statement: the UNIQUE
//! (voter_id, matchup_id, kind) index arbitrates concurrent writers,
//! and the loser surfaces as DuplicateVote. Votes are never updated
//! or deleted once persisted.

use faceoff_common::db::models::{Vote, VoteKind};
use faceoff_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Persist a vote; rejects a second vote for the same
/// (voter, matchup, kind).
///
/// The insert is guarded on the matchup still being active, so a
/// close landing between the caller's status check and this write
/// cannot smuggle a vote into a decided matchup.
pub async fn insert_vote(pool: &SqlitePool, vote: &Vote) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO votes (guid, voter_id, matchup_id, contestant_id, kind, created_at)
        SELECT ?, ?, ?, ?, ?, ?
        WHERE EXISTS (SELECT 1 FROM matchups WHERE guid = ? AND status = 'active')
        "#,
    )
    .bind(vote.guid.to_string())
    .bind(vote.voter_id.to_string())
    .bind(vote.matchup_id.to_string())
    .bind(vote.contestant_id.to_string())
    .bind(vote.kind.as_str())
    .bind(vote.created_at.to_rfc3339())
    .bind(vote.matchup_id.to_string())
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Err(Error::InvalidState(format!(
            "matchup {} is not accepting votes",
            vote.matchup_id
        ))),
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::DuplicateVote(
            format!("voter {} already voted on matchup {}", vote.voter_id, vote.matchup_id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Count regular-kind votes for one contestant on one matchup.
///
/// Tally values are pure aggregates over the stored vote set, so
/// recomputation is independent of the order votes arrived in.
pub async fn count_regular_votes(
    pool: &SqlitePool,
    matchup_id: Uuid,
    contestant_id: Uuid,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM votes
        WHERE matchup_id = ? AND contestant_id = ? AND kind = 'regular'
        "#,
    )
    .bind(matchup_id.to_string())
    .bind(contestant_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Whether a tie-break vote already exists for the matchup
pub async fn has_tie_break_vote(pool: &SqlitePool, matchup_id: Uuid) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM votes WHERE matchup_id = ? AND kind = 'tie_break'",
    )
    .bind(matchup_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Load all votes on a matchup, newest last
pub async fn load_matchup_votes(pool: &SqlitePool, matchup_id: Uuid) -> Result<Vec<Vote>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, voter_id, matchup_id, contestant_id, kind, created_at
        FROM votes
        WHERE matchup_id = ?
        ORDER BY created_at
        "#,
    )
    .bind(matchup_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut votes = Vec::with_capacity(rows.len());
    for row in rows {
        let guid_str: String = row.get("guid");
        let voter_str: String = row.get("voter_id");
        let matchup_str: String = row.get("matchup_id");
        let contestant_str: String = row.get("contestant_id");
        let kind_str: String = row.get("kind");
        let created_str: String = row.get("created_at");

        votes.push(Vote {
            guid: Uuid::parse_str(&guid_str)?,
            voter_id: Uuid::parse_str(&voter_str)?,
            matchup_id: Uuid::parse_str(&matchup_str)?,
            contestant_id: Uuid::parse_str(&contestant_str)?,
            kind: kind_str.parse::<VoteKind>()?,
            created_at: chrono::DateTime::parse_from_rfc3339(&created_str)
                .map(|dt| dt.with_timezone(&chrono::Utc))
                .unwrap_or_else(|_| chrono::Utc::now()),
        });
    }

    Ok(votes)
}
