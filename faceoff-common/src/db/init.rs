//! Database initialization
//!
//! Creates the tournament schema on first run. All table creation is
//! idempotent so startup can run it unconditionally; the uniqueness
//! indexes on votes and matchup positions are part of the schema, not
//! application-level checks.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist.
    // Pool sized for many voters writing concurrently.
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers with one writer; vote recording
    // contends on the same matchup rows under load
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
///
/// Also usable against an in-memory pool from tests.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_tournaments_table(pool).await?;
    create_contestants_table(pool).await?;
    create_rounds_table(pool).await?;
    create_matchups_table(pool).await?;
    create_votes_table(pool).await?;
    Ok(())
}

async fn create_tournaments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tournaments (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            bracket_generated INTEGER NOT NULL DEFAULT 0,
            champion_id TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_contestants_table(pool: &SqlitePool) -> Result<()> {
    // Seed is unique per (tournament, quadrant); the seed order drives
    // round-1 pairing
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contestants (
            guid TEXT PRIMARY KEY,
            tournament_id TEXT NOT NULL REFERENCES tournaments(guid),
            name TEXT NOT NULL,
            quadrant TEXT NOT NULL CHECK (quadrant IN ('A', 'B', 'C', 'D')),
            seed INTEGER NOT NULL CHECK (seed >= 1),
            UNIQUE (tournament_id, quadrant, seed)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_rounds_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rounds (
            guid TEXT PRIMARY KEY,
            tournament_id TEXT NOT NULL REFERENCES tournaments(guid),
            round_number INTEGER NOT NULL CHECK (round_number >= 1),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'active', 'completed')),
            UNIQUE (tournament_id, round_number)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_matchups_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matchups (
            guid TEXT PRIMARY KEY,
            round_id TEXT NOT NULL REFERENCES rounds(guid),
            position INTEGER NOT NULL CHECK (position >= 1),
            contestant1_id TEXT,
            contestant2_id TEXT,
            winner_id TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'active', 'completed')),
            contestant1_votes INTEGER NOT NULL DEFAULT 0,
            contestant2_votes INTEGER NOT NULL DEFAULT 0,
            is_tie INTEGER NOT NULL DEFAULT 0,
            UNIQUE (round_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_votes_table(pool: &SqlitePool) -> Result<()> {
    // UNIQUE (voter_id, matchup_id, kind) is the write-time uniqueness
    // contract: a losing concurrent writer gets a constraint violation,
    // never a silent overwrite or duplicate row
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            guid TEXT PRIMARY KEY,
            voter_id TEXT NOT NULL,
            matchup_id TEXT NOT NULL REFERENCES matchups(guid),
            contestant_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('regular', 'tie_break')),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE (voter_id, matchup_id, kind)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
