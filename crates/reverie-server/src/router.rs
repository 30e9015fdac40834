//! Axum router construction for the control-surface API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin read access.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// CORS allows any origin for the read endpoints; the turn RPC is
/// protected by its bearer token instead.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/worlds", get(handlers::list_worlds))
        .route("/api/worlds/{id}", get(handlers::get_world))
        .route("/api/worlds/{id}/turn", post(handlers::run_turn_handler))
        .route("/api/worlds/{id}/minds", get(handlers::list_minds))
        .route("/api/worlds/{id}/events", get(handlers::list_events))
        .route("/api/worlds/{id}/artifacts", get(handlers::list_artifacts))
        .route("/api/worlds/{id}/chronicles", get(handlers::list_chronicles))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
