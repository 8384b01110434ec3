//! Tournament database operations

use faceoff_common::db::models::Tournament;
use faceoff_common::Result;
use sqlx::{Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Save a new tournament
pub async fn insert_tournament(pool: &SqlitePool, tournament: &Tournament) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tournaments (guid, name, bracket_generated, champion_id, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(tournament.guid.to_string())
    .bind(&tournament.name)
    .bind(tournament.bracket_generated)
    .bind(tournament.champion_id.map(|id| id.to_string()))
    .bind(tournament.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load tournament by id
pub async fn load_tournament(pool: &SqlitePool, id: Uuid) -> Result<Option<Tournament>> {
    let row = sqlx::query(
        r#"
        SELECT guid, name, bracket_generated, champion_id, created_at
        FROM tournaments
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let champion_str: Option<String> = row.get("champion_id");
            let created_str: String = row.get("created_at");

            Ok(Some(Tournament {
                guid: Uuid::parse_str(&guid_str)?,
                name: row.get("name"),
                bracket_generated: row.get("bracket_generated"),
                champion_id: match champion_str {
                    Some(s) => Some(Uuid::parse_str(&s)?),
                    None => None,
                },
                created_at: chrono::DateTime::parse_from_rfc3339(&created_str)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .unwrap_or_else(|_| chrono::Utc::now()),
            }))
        }
        None => Ok(None),
    }
}

/// Mark the contestant pool as frozen; runs inside the bracket
/// generation transaction
pub async fn set_bracket_generated<'e, E>(executor: E, tournament_id: Uuid) -> Result<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE tournaments SET bracket_generated = 1 WHERE guid = ?")
        .bind(tournament_id.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

/// Record the champion once the Final's matchup completes
pub async fn set_champion(pool: &SqlitePool, tournament_id: Uuid, champion_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE tournaments SET champion_id = ? WHERE guid = ?")
        .bind(champion_id.to_string())
        .bind(tournament_id.to_string())
        .execute(pool)
        .await?;
    Ok(())
}
