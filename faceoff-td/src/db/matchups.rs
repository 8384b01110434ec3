//! Matchup database operations

use faceoff_common::db::models::{Matchup, MatchupStatus};
use faceoff_common::Result;
use sqlx::{Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Save a new matchup; accepts a transaction during bracket generation
/// and round propagation
pub async fn insert_matchup<'e, E>(executor: E, matchup: &Matchup) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO matchups (
            guid, round_id, position, contestant1_id, contestant2_id,
            winner_id, status, contestant1_votes, contestant2_votes, is_tie
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(matchup.guid.to_string())
    .bind(matchup.round_id.to_string())
    .bind(matchup.position)
    .bind(matchup.contestant1_id.map(|id| id.to_string()))
    .bind(matchup.contestant2_id.map(|id| id.to_string()))
    .bind(matchup.winner_id.map(|id| id.to_string()))
    .bind(matchup.status.as_str())
    .bind(matchup.contestant1_votes)
    .bind(matchup.contestant2_votes)
    .bind(matchup.is_tie)
    .execute(executor)
    .await?;

    Ok(())
}

fn matchup_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Matchup> {
    let guid_str: String = row.get("guid");
    let round_str: String = row.get("round_id");
    let c1_str: Option<String> = row.get("contestant1_id");
    let c2_str: Option<String> = row.get("contestant2_id");
    let winner_str: Option<String> = row.get("winner_id");
    let status_str: String = row.get("status");

    Ok(Matchup {
        guid: Uuid::parse_str(&guid_str)?,
        round_id: Uuid::parse_str(&round_str)?,
        position: row.get("position"),
        contestant1_id: match c1_str {
            Some(s) => Some(Uuid::parse_str(&s)?),
            None => None,
        },
        contestant2_id: match c2_str {
            Some(s) => Some(Uuid::parse_str(&s)?),
            None => None,
        },
        winner_id: match winner_str {
            Some(s) => Some(Uuid::parse_str(&s)?),
            None => None,
        },
        status: status_str.parse()?,
        contestant1_votes: row.get("contestant1_votes"),
        contestant2_votes: row.get("contestant2_votes"),
        is_tie: row.get("is_tie"),
    })
}

const MATCHUP_COLUMNS: &str = "guid, round_id, position, contestant1_id, contestant2_id, \
     winner_id, status, contestant1_votes, contestant2_votes, is_tie";

/// Load matchup by id
pub async fn load_matchup(pool: &SqlitePool, id: Uuid) -> Result<Option<Matchup>> {
    let sql = format!("SELECT {} FROM matchups WHERE guid = ?", MATCHUP_COLUMNS);
    let row = sqlx::query(&sql).bind(id.to_string()).fetch_optional(pool).await?;

    row.as_ref().map(matchup_from_row).transpose()
}

/// Load all matchups of a round, ordered by position ascending
pub async fn load_round_matchups(pool: &SqlitePool, round_id: Uuid) -> Result<Vec<Matchup>> {
    let sql = format!(
        "SELECT {} FROM matchups WHERE round_id = ? ORDER BY position",
        MATCHUP_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(round_id.to_string()).fetch_all(pool).await?;

    rows.iter().map(matchup_from_row).collect()
}

/// Activate every pending matchup of the round that has both slots
/// populated. Bye matchups are already Completed and stay untouched.
pub async fn activate_pending_matchups(pool: &SqlitePool, round_id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE matchups
        SET status = 'active'
        WHERE round_id = ?
          AND status = 'pending'
          AND contestant1_id IS NOT NULL
          AND contestant2_id IS NOT NULL
        "#,
    )
    .bind(round_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Compare-and-set close: Active -> Completed exactly once.
///
/// Returns true if this caller closed the matchup; false means another
/// caller already did (or the matchup was never active). The loser of
/// a close race must treat false as already-resolved state.
pub async fn complete_matchup(pool: &SqlitePool, id: Uuid, winner_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE matchups
        SET status = 'completed', winner_id = ?
        WHERE guid = ? AND status = 'active'
        "#,
    )
    .bind(winner_id.to_string())
    .bind(id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Flag a deadlocked tally. The matchup stays Active; is_tie is never
/// cleared afterwards, it remains as a historical marker.
pub async fn mark_tie(pool: &SqlitePool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE matchups SET is_tie = 1 WHERE guid = ? AND status = 'active'")
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Store recomputed regular-vote aggregates
pub async fn update_vote_counts(
    pool: &SqlitePool,
    id: Uuid,
    contestant1_votes: i64,
    contestant2_votes: i64,
) -> Result<()> {
    sqlx::query("UPDATE matchups SET contestant1_votes = ?, contestant2_votes = ? WHERE guid = ?")
        .bind(contestant1_votes)
        .bind(contestant2_votes)
        .bind(id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}

/// Number of matchups in the round not yet Completed
pub async fn count_incomplete(pool: &SqlitePool, round_id: Uuid) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM matchups WHERE round_id = ? AND status != ?",
    )
    .bind(round_id.to_string())
    .bind(MatchupStatus::Completed.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Matchups flagged as tied with no tie-break vote yet, across the
/// whole tournament
pub async fn load_unresolved_ties(pool: &SqlitePool, tournament_id: Uuid) -> Result<Vec<Matchup>> {
    let sql = format!(
        r#"
        SELECT {} FROM matchups
        WHERE round_id IN (SELECT guid FROM rounds WHERE tournament_id = ?)
          AND is_tie = 1
          AND NOT EXISTS (
              SELECT 1 FROM votes
              WHERE votes.matchup_id = matchups.guid AND votes.kind = 'tie_break'
          )
        ORDER BY position
        "#,
        MATCHUP_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(tournament_id.to_string())
        .fetch_all(pool)
        .await?;

    rows.iter().map(matchup_from_row).collect()
}
