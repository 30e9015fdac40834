//! HTTP-level tests for the control-surface API against the in-memory
//! store with the silent oracle.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reverie_engine::config::{FounderSeed, MechanicsConfig, SeedConfig};
use reverie_engine::SilentOracle;
use reverie_server::{build_router, ensure_world, AppState, OracleHandle};
use reverie_store::Store;
use reverie_types::WorldId;
use tower::ServiceExt;

const SECRET: &str = "turn-key";

async fn test_app() -> (Router, WorldId, Store) {
    let store = Store::memory();
    let seed = SeedConfig {
        world_name: String::from("Test World"),
        turn_cadence_secs: 0,
        max_active_minds: 50,
        spawn_cost: 25,
        chaos_probability: 0.0,
        founders: vec![
            FounderSeed {
                name: String::from("Aster"),
                traits: vec![String::from("curious")],
                purpose: String::from("to wonder"),
            },
            FounderSeed {
                name: String::from("Briar"),
                traits: vec![String::from("patient")],
                purpose: String::from("to keep"),
            },
        ],
    };
    let world_id = ensure_world(&store, &seed).await.unwrap();

    let mechanics = MechanicsConfig {
        fade_probability: 0.0,
        ..MechanicsConfig::default()
    };
    let state = Arc::new(AppState::with_seed(
        store.clone(),
        OracleHandle::Silent(SilentOracle),
        mechanics,
        SECRET.to_owned(),
        17,
    ));
    (build_router(state), world_id, store)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn turn_request(world_id: WorldId, token: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri(format!("/api/worlds/{world_id}/turn"));
    let builder = match token {
        Some(t) => builder.header("Authorization", format!("Bearer {t}")),
        None => builder,
    };
    builder.body(Body::empty()).unwrap()
}

fn get_request(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn turn_requires_bearer_auth() {
    let (app, world_id, _store) = test_app().await;

    let response = app
        .clone()
        .oneshot(turn_request(world_id, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(turn_request(world_id, Some("wrong")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authorized_turn_returns_report_and_advances_world() {
    let (app, world_id, store) = test_app().await;

    let response = app
        .oneshot(turn_request(world_id, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = body_json(response).await;
    assert_eq!(report["turn_number"], 1);
    assert_eq!(report["minds_processed"], 2);
    assert_eq!(report["chronicle_headline"], "Silence");

    let world = store.get_world(world_id).await.unwrap().unwrap();
    assert_eq!(world.current_turn, 1);
}

#[tokio::test]
async fn cadence_violation_returns_429_with_retry_hint() {
    let (app, world_id, store) = test_app().await;

    // Stretch the cadence after seeding so the first turn runs clean.
    let mut world = store.get_world(world_id).await.unwrap().unwrap();
    world.turn_cadence_secs = 3600;
    store.update_world(&world).await.unwrap();

    let response = app
        .clone()
        .oneshot(turn_request(world_id, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(turn_request(world_id, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    let body = body_json(response).await;
    assert!(body["retry_after_secs"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn unknown_world_is_404_and_bad_uuid_is_400() {
    let (app, _world_id, _store) = test_app().await;

    let response = app
        .clone()
        .oneshot(turn_request(WorldId::new(), Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get_request("/api/worlds/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_endpoints_serve_world_state() {
    let (app, world_id, _store) = test_app().await;

    // Run one turn so there is an event and a chronicle to read.
    let response = app
        .clone()
        .oneshot(turn_request(world_id, Some(SECRET)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/worlds/{world_id}/minds?status=active")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let minds = body_json(response).await;
    assert_eq!(minds["count"], 2);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/worlds/{world_id}/events?turn=1")))
        .await
        .unwrap();
    let events = body_json(response).await;
    assert_eq!(events["count"], 1);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/worlds/{world_id}/chronicles")))
        .await
        .unwrap();
    let chronicles = body_json(response).await;
    assert_eq!(chronicles["count"], 1);
    assert_eq!(chronicles["chronicles"][0]["headline"], "Silence");

    let response = app
        .oneshot(get_request(&format!("/api/worlds/{world_id}/minds?status=bogus")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
