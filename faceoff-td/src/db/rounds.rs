//! Round database operations

use faceoff_common::db::models::{Round, RoundStatus};
use faceoff_common::Result;
use sqlx::{Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Save a new round; accepts a transaction during bracket generation
/// and round propagation
pub async fn insert_round<'e, E>(executor: E, round: &Round) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO rounds (guid, tournament_id, round_number, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(round.guid.to_string())
    .bind(round.tournament_id.to_string())
    .bind(round.round_number)
    .bind(round.status.as_str())
    .execute(executor)
    .await?;

    Ok(())
}

fn round_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Round> {
    let guid_str: String = row.get("guid");
    let tournament_str: String = row.get("tournament_id");
    let status_str: String = row.get("status");

    Ok(Round {
        guid: Uuid::parse_str(&guid_str)?,
        tournament_id: Uuid::parse_str(&tournament_str)?,
        round_number: row.get("round_number"),
        status: status_str.parse()?,
    })
}

/// Load round by id
pub async fn load_round(pool: &SqlitePool, id: Uuid) -> Result<Option<Round>> {
    let row = sqlx::query(
        "SELECT guid, tournament_id, round_number, status FROM rounds WHERE guid = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(round_from_row).transpose()
}

/// Load all rounds of a tournament, ordered by round_number ascending
pub async fn load_rounds(pool: &SqlitePool, tournament_id: Uuid) -> Result<Vec<Round>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, tournament_id, round_number, status
        FROM rounds
        WHERE tournament_id = ?
        ORDER BY round_number
        "#,
    )
    .bind(tournament_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(round_from_row).collect()
}

/// Compare-and-set on round status.
///
/// Returns true if this caller performed the transition; false means
/// the round was not in `from` (typically a concurrent caller won the
/// race). Round propagation is gated on the Active -> Completed CAS
/// so it runs at most once per round.
pub async fn transition_round(
    pool: &SqlitePool,
    round_id: Uuid,
    from: RoundStatus,
    to: RoundStatus,
) -> Result<bool> {
    let result = sqlx::query("UPDATE rounds SET status = ? WHERE guid = ? AND status = ?")
        .bind(to.as_str())
        .bind(round_id.to_string())
        .bind(from.as_str())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() == 1)
}
