//! Contestant database operations
//!
//! Contestants are written during tournament setup and read-only once
//! the bracket exists.

use faceoff_common::db::models::{Contestant, Quadrant};
use faceoff_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Save a new contestant
///
/// The (tournament, quadrant, seed) slot is unique; a second
/// registration for the same slot is rejected.
pub async fn insert_contestant(pool: &SqlitePool, contestant: &Contestant) -> Result<()> {
    let result = sqlx::query(
        r#"
        INSERT INTO contestants (guid, tournament_id, name, quadrant, seed)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(contestant.guid.to_string())
    .bind(contestant.tournament_id.to_string())
    .bind(&contestant.name)
    .bind(contestant.quadrant.as_str())
    .bind(contestant.seed)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Validation(format!(
            "seed {} is already taken in quadrant {}",
            contestant.seed, contestant.quadrant
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Load all contestants of a tournament, partitioned by quadrant and
/// ordered by seed ascending within each quadrant
pub async fn load_quadrant_contestants(
    pool: &SqlitePool,
    tournament_id: Uuid,
) -> Result<BTreeMap<Quadrant, Vec<Contestant>>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, tournament_id, name, quadrant, seed
        FROM contestants
        WHERE tournament_id = ?
        ORDER BY quadrant, seed
        "#,
    )
    .bind(tournament_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut quadrants: BTreeMap<Quadrant, Vec<Contestant>> = BTreeMap::new();
    for row in rows {
        let guid_str: String = row.get("guid");
        let tournament_str: String = row.get("tournament_id");
        let quadrant_str: String = row.get("quadrant");

        let contestant = Contestant {
            guid: Uuid::parse_str(&guid_str)?,
            tournament_id: Uuid::parse_str(&tournament_str)?,
            name: row.get("name"),
            quadrant: quadrant_str.parse()?,
            seed: row.get("seed"),
        };
        quadrants.entry(contestant.quadrant).or_default().push(contestant);
    }

    Ok(quadrants)
}

/// Load a single contestant by id
pub async fn load_contestant(pool: &SqlitePool, id: Uuid) -> Result<Option<Contestant>> {
    let row = sqlx::query(
        r#"
        SELECT guid, tournament_id, name, quadrant, seed
        FROM contestants
        WHERE guid = ?
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let guid_str: String = row.get("guid");
            let tournament_str: String = row.get("tournament_id");
            let quadrant_str: String = row.get("quadrant");

            Ok(Some(Contestant {
                guid: Uuid::parse_str(&guid_str)?,
                tournament_id: Uuid::parse_str(&tournament_str)?,
                name: row.get("name"),
                quadrant: quadrant_str.parse()?,
                seed: row.get("seed"),
            }))
        }
        None => Ok(None),
    }
}
