//! Integration tests for faceoff-td API endpoints
//!
//! Exercises the full HTTP surface against an in-memory database:
//! tournament setup, bracket generation, voting, resolution, and
//! tie-break handling, including the error envelope for recoverable
//! voting failures.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use faceoff_common::db::create_tables;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use faceoff_td::{build_router, AppState};

/// Test helper: in-memory database with the full schema
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should create in-memory database");
    create_tables(&pool).await.expect("Should create tables");
    pool
}

/// Test helper: create app with test state
fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db))
}

/// Test helper: JSON POST request
fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: GET request
fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: create a tournament over HTTP and return its id
async fn create_tournament(app: &axum::Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(post_json("/api/tournaments", json!({ "name": name })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["guid"].as_str().unwrap().to_string()
}

/// Test helper: register a contestant, returning its id
async fn add_contestant(
    app: &axum::Router,
    tournament_id: &str,
    name: &str,
    quadrant: &str,
    seed: i64,
) -> String {
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/contestants", tournament_id),
            json!({ "name": name, "quadrant": quadrant, "seed": seed }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["guid"].as_str().unwrap().to_string()
}

/// Test helper: the classic 8-contestant setup. Overall seeds 1-8 land
/// as quadrant A={1,2}, B={3,4}, C={5,6}, D={7,8}, each seeded 1-2
/// within its quadrant.
async fn setup_eight(app: &axum::Router) -> (String, Vec<String>) {
    let tournament_id = create_tournament(app, "Great Eight").await;
    let mut ids = Vec::new();
    for (name, quadrant, seed) in [
        ("1", "A", 1),
        ("2", "A", 2),
        ("3", "B", 1),
        ("4", "B", 2),
        ("5", "C", 1),
        ("6", "C", 2),
        ("7", "D", 1),
        ("8", "D", 2),
    ] {
        ids.push(add_contestant(app, &tournament_id, name, quadrant, seed).await);
    }
    (tournament_id, ids)
}

async fn generate_bracket(app: &axum::Router, tournament_id: &str) {
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/bracket", tournament_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn fetch_bracket(app: &axum::Router, tournament_id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(get(&format!("/api/tournaments/{}/bracket", tournament_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

/// Cast one regular vote, returning the raw response
async fn vote(
    app: &axum::Router,
    matchup_id: &str,
    voter_id: &str,
    contestant_id: &str,
) -> axum::response::Response {
    app.clone()
        .oneshot(post_json(
            &format!("/api/matchups/{}/votes", matchup_id),
            json!({ "voter_id": voter_id, "contestant_id": contestant_id }),
        ))
        .await
        .unwrap()
}

/// Request winner determination for a matchup (the scheduler's
/// window-close call)
async fn resolve(app: &axum::Router, matchup_id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/matchups/{}/resolution", matchup_id), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

fn random_voter() -> String {
    uuid::Uuid::new_v4().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "faceoff-td");
}

// =============================================================================
// Setup and generation
// =============================================================================

#[tokio::test]
async fn test_contestant_on_unknown_tournament_is_404() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/contestants", uuid::Uuid::new_v4()),
            json!({ "name": "X", "quadrant": "A", "seed": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_quadrant_is_400() {
    let app = setup_app(setup_test_db().await);
    let tournament_id = create_tournament(&app, "Cup").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/contestants", tournament_id),
            json!({ "name": "X", "quadrant": "E", "seed": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_generation_with_missing_quadrant_is_400_and_commits_nothing() {
    let app = setup_app(setup_test_db().await);
    let tournament_id = create_tournament(&app, "Cup").await;
    // Quadrant D left empty
    for (name, quadrant) in [("a", "A"), ("b", "B"), ("c", "C")] {
        add_contestant(&app, &tournament_id, name, quadrant, 1).await;
    }

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/bracket", tournament_id),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bracket = fetch_bracket(&app, &tournament_id).await;
    assert_eq!(bracket["tournament"]["bracket_generated"], false);
    assert_eq!(bracket["rounds"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_contestants_freeze_after_generation() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, _) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tournaments/{}/contestants", tournament_id),
            json!({ "name": "late", "quadrant": "A", "seed": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bracket_view_matches_crossover_seeding() {
    // Round 1 positions 1-4 must be (1v2),(5v6),(3v4),(7v8): quadrant
    // order A, C, B, D with seed 1 against seed 2 inside each
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let rounds = bracket["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0]["round_number"], 1);
    assert_eq!(rounds[0]["status"], "active");

    let matchups = rounds[0]["matchups"].as_array().unwrap();
    assert_eq!(matchups.len(), 4);

    // ids[i] is the contestant named (i+1)
    let expected = [(0, 1), (4, 5), (2, 3), (6, 7)];
    for (position, (left, right)) in expected.iter().enumerate() {
        let matchup = &matchups[position];
        assert_eq!(matchup["position"], position as i64 + 1);
        assert_eq!(matchup["contestant1_id"], ids[*left].as_str());
        assert_eq!(matchup["contestant2_id"], ids[*right].as_str());
        assert_eq!(matchup["status"], "active");
        assert_eq!(matchup["vote_counts"]["total_votes"], 0);
        assert_eq!(matchup["is_tie"], false);
    }
}

// =============================================================================
// Voting
// =============================================================================

#[tokio::test]
async fn test_vote_flow_and_error_envelope() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup_id =
        bracket["rounds"][0]["matchups"][0]["guid"].as_str().unwrap().to_string();

    // Vote for a contestant outside the matchup
    let response = vote(&app, &matchup_id, &random_voter(), &ids[7]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_CHOICE");

    // First vote lands, matchup stays open
    let voter = random_voter();
    let response = vote(&app, &matchup_id, &voter, &ids[0]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["matchup_status"], "active");

    // Same voter twice - even with the other contestant
    let response = vote(&app, &matchup_id, &voter, &ids[1]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_VOTE");
}

#[tokio::test]
async fn test_vote_on_decided_matchup_is_conflict() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup_id =
        bracket["rounds"][0]["matchups"][0]["guid"].as_str().unwrap().to_string();

    // One vote, then the window closes: 1-0 decides it
    let response = vote(&app, &matchup_id, &random_voter(), &ids[0]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = resolve(&app, &matchup_id).await;
    assert_eq!(body["winner_id"], ids[0].as_str());

    let response = vote(&app, &matchup_id, &random_voter(), &ids[1]).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_winners_advance_with_crossover_pairing() {
    // Winners 1, 5, 3, 7 must meet as (1v5) and (3v7) in round 2
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchups = bracket["rounds"][0]["matchups"].as_array().unwrap().clone();
    for matchup in &matchups {
        let matchup_id = matchup["guid"].as_str().unwrap();
        let winner = matchup["contestant1_id"].as_str().unwrap();
        let response = vote(&app, matchup_id, &random_voter(), winner).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = resolve(&app, matchup_id).await;
        assert_eq!(body["winner_id"], winner);
    }

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let rounds = bracket["rounds"].as_array().unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0]["status"], "completed");
    assert_eq!(rounds[1]["name"], "Semifinals");

    let semis = rounds[1]["matchups"].as_array().unwrap();
    assert_eq!(semis.len(), 2);
    assert_eq!(semis[0]["contestant1_id"], ids[0].as_str());
    assert_eq!(semis[0]["contestant2_id"], ids[4].as_str());
    assert_eq!(semis[1]["contestant1_id"], ids[2].as_str());
    assert_eq!(semis[1]["contestant2_id"], ids[6].as_str());
}

// =============================================================================
// Resolution and tie-breaks
// =============================================================================

#[tokio::test]
async fn test_zero_vote_resolution_flags_tie_for_admin() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, _) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup_id =
        bracket["rounds"][0]["matchups"][0]["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(&format!("/api/matchups/{}/resolution", matchup_id), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["winner_id"], Value::Null);
    assert_eq!(body["is_tie"], true);

    let tied = app
        .clone()
        .oneshot(get(&format!("/api/tournaments/{}/tied-matchups", tournament_id)))
        .await
        .unwrap();
    let tied_body = extract_json(tied.into_body()).await;
    assert_eq!(tied_body.as_array().unwrap().len(), 1);
    assert_eq!(tied_body[0]["guid"], matchup_id.as_str());
}

#[tokio::test]
async fn test_tie_break_resolves_and_rejects_repeat() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup_id =
        bracket["rounds"][0]["matchups"][0]["guid"].as_str().unwrap().to_string();

    // 1-1 deadlock, flagged when the window closes
    vote(&app, &matchup_id, &random_voter(), &ids[0]).await;
    vote(&app, &matchup_id, &random_voter(), &ids[1]).await;
    let body = resolve(&app, &matchup_id).await;
    assert_eq!(body["is_tie"], true);

    let admin = random_voter();
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/matchups/{}/tie-break", matchup_id),
            json!({ "contestant_id": ids[0], "admin_id": admin }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["winner_id"], ids[0].as_str());

    // Historical tie marker survives the resolution
    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup = &bracket["rounds"][0]["matchups"][0];
    assert_eq!(matchup["status"], "completed");
    assert_eq!(matchup["is_tie"], true);
    assert_eq!(matchup["winner_id"], ids[0].as_str());

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/matchups/{}/tie-break", matchup_id),
            json!({ "contestant_id": ids[1], "admin_id": admin }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "ALREADY_RESOLVED");
}

#[tokio::test]
async fn test_tie_break_on_undisputed_matchup_is_conflict() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    let bracket = fetch_bracket(&app, &tournament_id).await;
    let matchup_id =
        bracket["rounds"][0]["matchups"][0]["guid"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/matchups/{}/tie-break", matchup_id),
            json!({ "contestant_id": ids[0], "admin_id": random_voter() }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_TIED");
}

// =============================================================================
// Champion
// =============================================================================

#[tokio::test]
async fn test_tournament_runs_to_champion() {
    let app = setup_app(setup_test_db().await);
    let (tournament_id, ids) = setup_eight(&app).await;
    generate_bracket(&app, &tournament_id).await;

    // Advance contestant "1" through every round
    loop {
        let bracket = fetch_bracket(&app, &tournament_id).await;
        if bracket["tournament"]["champion_id"] != Value::Null {
            break;
        }
        let rounds = bracket["rounds"].as_array().unwrap();
        let active_round = rounds
            .iter()
            .find(|r| r["status"] == "active")
            .expect("No active round but no champion either");
        for matchup in active_round["matchups"].as_array().unwrap() {
            if matchup["status"] == "active" {
                let matchup_id = matchup["guid"].as_str().unwrap();
                let winner = matchup["contestant1_id"].as_str().unwrap();
                vote(&app, matchup_id, &random_voter(), winner).await;
                resolve(&app, matchup_id).await;
            }
        }
    }

    let bracket = fetch_bracket(&app, &tournament_id).await;
    assert_eq!(bracket["tournament"]["champion_id"], ids[0].as_str());

    let response = app
        .clone()
        .oneshot(get(&format!("/api/tournaments/{}", tournament_id)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["champion_id"], ids[0].as_str());
}
