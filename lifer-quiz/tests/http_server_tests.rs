//! HTTP server & routing integration tests
//!
//! Drives the full router with in-memory state. Nothing here touches the
//! network: quiz tests use the photo modality and the search/sounds tests
//! only exercise the validation paths.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use lifer_common::events::EventBus;
use lifer_quiz::list_store::ListStore;
use lifer_quiz::{build_router, AppState};

/// Create test app state with an in-memory database
async fn test_app() -> Router {
    let db_pool = sqlx::SqlitePool::connect(":memory:").await.unwrap();
    lifer_common::db::init_tables(&db_pool).await.unwrap();

    let event_bus = EventBus::new(100);
    let state = AppState::new(db_pool, event_bus, ListStore::default()).unwrap();
    build_router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn species(id: u64, common: &str, scientific: &str) -> Value {
    json!({
        "id": id,
        "common_name": common,
        "scientific_name": scientific,
        "photo_url": format!("https://example.org/{id}.jpg"),
    })
}

async fn add_species(app: &Router, record: Value) {
    let (status, _) = send(app, "POST", "/api/list/add", Some(record)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lifer-quiz");
}

#[tokio::test]
async fn empty_list_round_trip() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/list", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["species"].as_array().unwrap().len(), 0);
    assert_eq!(body["active_name"], Value::Null);
    assert_eq!(body["streak"], 0);
}

#[tokio::test]
async fn add_sorts_and_rejects_duplicates() {
    let app = test_app().await;
    add_species(&app, species(2, "Taita Sunbird", "Cinnyris fuelleborni")).await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/list/add",
        Some(species(1, "Amani Sunbird", "Hedydipna pallidigaster")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Amani Sunbird"));

    let (_, body) = send(&app, "GET", "/api/list", None).await;
    let names: Vec<&str> = body["species"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["common_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Amani Sunbird", "Taita Sunbird"]);
}

#[tokio::test]
async fn remove_and_clear() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    // Removing an unknown id is a no-op
    let (status, body) = send(&app, "DELETE", "/api/list/99", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["species"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "DELETE", "/api/list/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["species"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "POST", "/api/list/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["species"].as_array().unwrap().len(), 0);
    assert_eq!(body["active_name"], Value::Null);
}

#[tokio::test]
async fn save_load_delete_flow() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    // Save snapshots and empties the current list
    let (status, body) = send(&app, "POST", "/api/lists/save", Some(json!({"name": "Coast"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Coast");
    assert_eq!(body[0]["species_count"], 2);
    assert_eq!(body[0]["active"], true);

    let (_, body) = send(&app, "GET", "/api/list", None).await;
    assert_eq!(body["species"].as_array().unwrap().len(), 0);
    assert_eq!(body["active_name"], "Coast");

    // Case-insensitive name collision
    add_species(&app, species(3, "Taita Sunbird", "Cinnyris fuelleborni")).await;
    let (status, _) = send(&app, "POST", "/api/lists/save", Some(json!({"name": "coast"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Empty and whitespace names are rejected
    let (status, _) = send(&app, "POST", "/api/lists/save", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Load replaces the current list
    let (status, body) = send(&app, "POST", "/api/lists/load", Some(json!({"name": "Coast"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["species"].as_array().unwrap().len(), 2);
    assert_eq!(body["streak"], 0);

    let (status, _) = send(&app, "POST", "/api/lists/load", Some(json!({"name": "Highlands"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Delete requires the confirmation guard
    let (status, _) = send(&app, "DELETE", "/api/lists/Coast", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "DELETE", "/api/lists/Coast?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    // Deleting an unknown list is a non-fatal no-op
    let (status, body) = send(&app, "DELETE", "/api/lists/Coast?confirm=true", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], false);

    // The deleted list was active; the sentinel is back
    let (_, body) = send(&app, "GET", "/api/list", None).await;
    assert_eq!(body["active_name"], Value::Null);
}

#[tokio::test]
async fn save_on_empty_list_fails() {
    let app = test_app().await;
    let (status, _) = send(&app, "POST", "/api/lists/save", Some(json!({"name": "Coast"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, "GET", "/api/lists", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn quiz_requires_two_species() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;

    let (status, body) = send(&app, "GET", "/api/quiz/next", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("at least 2"));
}

#[tokio::test]
async fn quiz_question_has_expected_options() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    let (status, body) = send(&app, "GET", "/api/quiz/next?modality=photo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modality"], "photo");

    let options = body["options"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    // The photo prompt comes straight from the drawn record
    assert!(body["media_url"].as_str().unwrap().starts_with("https://example.org/"));
}

#[tokio::test]
async fn answer_without_question_conflicts() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/quiz/answer",
        Some(json!({"choice": "Amani Sunbird"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn first_answer_is_binding() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    let (_, question) = send(&app, "GET", "/api/quiz/next", None).await;
    let choice = question["options"][0].clone();

    let (status, first) = send(&app, "POST", "/api/quiz/answer", Some(json!({"choice": choice}))).await;
    assert_eq!(status, StatusCode::OK);

    // Same question, second selection: nothing moves
    let (status, second) = send(
        &app,
        "POST",
        "/api/quiz/answer",
        Some(json!({"choice": first["correct_name"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["outcome"], first["outcome"]);
    assert_eq!(second["streak"], first["streak"]);
}

#[tokio::test]
async fn wrong_answer_zeroes_streak() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    send(&app, "GET", "/api/quiz/next", None).await;

    // A choice outside the option set can never be the target
    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz/answer",
        Some(json!({"choice": "Common Ostrich"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "incorrect");
    assert_eq!(body["streak"], 0);
}

#[tokio::test]
async fn correct_streak_raises_saved_list_high_score() {
    let app = test_app().await;

    // Two records sharing a display name under distinct ids: the generator
    // refuses a same-named distractor, so the single option is the target
    // and a correct answer can be forced deterministically.
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Amani Sunbird", "Hedydipna pallidigaster subsp")).await;

    let (status, _) = send(&app, "POST", "/api/lists/save", Some(json!({"name": "Usambara"}))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", "/api/lists/load", Some(json!({"name": "Usambara"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, question) = send(&app, "GET", "/api/quiz/next", None).await;
    let options = question["options"].as_array().unwrap();
    assert_eq!(options.len(), 1, "same-named distractor must be skipped");

    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz/answer",
        Some(json!({"choice": options[0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "correct");
    assert_eq!(body["streak"], 1);

    let (_, lists) = send(&app, "GET", "/api/lists", None).await;
    assert_eq!(lists[0]["name"], "Usambara");
    assert_eq!(lists[0]["high_score"], 1);
}

#[tokio::test]
async fn quiz_state_tracks_selection_and_outcome() {
    let app = test_app().await;
    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;

    let (_, state) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(state["question_posed"], false);
    assert_eq!(state["selection"], Value::Null);

    send(&app, "GET", "/api/quiz/next", None).await;
    let (_, state) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(state["question_posed"], true);
    assert_eq!(state["outcome"], Value::Null);

    send(
        &app,
        "POST",
        "/api/quiz/answer",
        Some(json!({"choice": "Common Ostrich"})),
    )
    .await;
    let (_, state) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(state["selection"], "Common Ostrich");
    assert_eq!(state["outcome"], "incorrect");
    assert_eq!(state["streak"], 0);
}

#[tokio::test]
async fn search_rejects_empty_input() {
    let app = test_app().await;

    let (status, _) = send(&app, "POST", "/api/search", Some(json!({"names": []}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/search",
        Some(json!({"names": ["", "   "]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_search_session_is_404() {
    let app = test_app().await;
    let (status, _) = send(
        &app,
        "GET",
        "/api/search/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sounds_proxy_requires_species_param() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/sounds", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Species name required"));

    let (status, _) = send(&app, "GET", "/api/sounds?species=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_survives_rehydration() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("lifer.db");
    let db_pool = lifer_common::db::init_database_pool(&db_path).await.unwrap();

    let state = AppState::new(db_pool.clone(), EventBus::new(100), ListStore::default()).unwrap();
    let app = build_router(state);

    add_species(&app, species(1, "Amani Sunbird", "Hedydipna pallidigaster")).await;
    add_species(&app, species(2, "Sokoke Pipit", "Anthus sokokensis")).await;
    send(&app, "POST", "/api/lists/save", Some(json!({"name": "Coast"}))).await;
    send(&app, "POST", "/api/lists/load", Some(json!({"name": "Coast"}))).await;

    // A fresh store hydrated from the same database sees the same state
    let rehydrated = ListStore::hydrate(&db_pool).await.unwrap();
    assert_eq!(rehydrated.current().len(), 2);
    assert_eq!(rehydrated.active_name(), Some("Coast"));
    assert_eq!(rehydrated.saved_lists().len(), 1);
    assert_eq!(rehydrated.saved_lists()[0].name, "Coast");
}
