//! REST endpoint handlers for the control-surface server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `POST` | `/api/worlds/{id}/turn` | Run one turn (bearer auth) |
//! | `GET` | `/api/worlds` | List worlds |
//! | `GET` | `/api/worlds/{id}` | World snapshot |
//! | `GET` | `/api/worlds/{id}/minds` | List minds |
//! | `GET` | `/api/worlds/{id}/events` | Query events |
//! | `GET` | `/api/worlds/{id}/artifacts` | List artifacts |
//! | `GET` | `/api/worlds/{id}/chronicles` | List chronicles |

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use axum::Json;
use reverie_engine::run_turn;
use reverie_types::{MindStatus, WorldId};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for `GET /api/worlds/{id}/minds`.
#[derive(Debug, serde::Deserialize)]
pub struct MindsQuery {
    /// Filter by status. Accepted values: `active`, `inactive`, `all`
    /// (default `all`).
    pub status: Option<String>,
}

/// Query parameters for `GET /api/worlds/{id}/events`.
#[derive(Debug, serde::Deserialize)]
pub struct EventsQuery {
    /// Return events for a specific turn.
    pub turn: Option<u64>,
    /// Maximum number of events to return (default 100, max 1000).
    pub limit: Option<usize>,
}

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let worlds = state.store.list_worlds().await?;
    let rows: String = worlds
        .iter()
        .map(|w| {
            format!(
                "<li>{} -- turn {} ({:?}) -- <a href=\"/api/worlds/{}\">/api/worlds/{}</a></li>",
                w.name, w.current_turn, w.status, w.id, w.id
            )
        })
        .collect();

    Ok(Html(format!(
        r"<!DOCTYPE html>
<html lang=en>
<head><meta charset=utf-8><title>Reverie</title></head>
<body style='background:#0d1117;color:#c9d1d9;font-family:monospace;padding:2rem'>
<h1 style='color:#58a6ff'>Reverie</h1>
<p>A world of minds, turning.</p>
<ul>{rows}</ul>
</body>
</html>"
    )))
}

/// Run one turn for a world.
///
/// Requires `Authorization: Bearer <shared_secret>`. Authorization is
/// checked before anything else so an unauthorized call never touches
/// world state.
pub async fn run_turn_handler(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers)?;
    let world_id = WorldId::from(parse_uuid(&id_str)?);

    let Ok(mut rng) = state.turn.try_lock() else {
        return Err(ApiError::TurnInProgress);
    };

    let report = run_turn(
        &state.store,
        &state.oracle,
        &state.mechanics,
        world_id,
        &mut rng,
    )
    .await?;
    info!(
        turn = report.turn_number,
        events = report.events,
        births = report.births,
        fades = report.fades,
        "Turn completed via API"
    );
    Ok(Json(report))
}

/// List all worlds.
pub async fn list_worlds(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let worlds = state.store.list_worlds().await?;
    Ok(Json(worlds))
}

/// Return a single world snapshot.
pub async fn get_world(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let world_id = WorldId::from(parse_uuid(&id_str)?);
    let world = state
        .store
        .get_world(world_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("world {world_id}")))?;
    Ok(Json(world))
}

/// List a world's minds, optionally filtered by status.
pub async fn list_minds(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<MindsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let world_id = WorldId::from(parse_uuid(&id_str)?);
    let status = match params.status.as_deref() {
        Some("active") => Some(MindStatus::Active),
        Some("inactive") => Some(MindStatus::Inactive),
        None | Some("all") => None,
        Some(other) => {
            return Err(ApiError::InvalidQuery(format!("unknown status: {other}")));
        }
    };
    let minds = state.store.list_minds(world_id, status).await?;
    Ok(Json(serde_json::json!({
        "count": minds.len(),
        "minds": minds,
    })))
}

/// Query a world's events, newest window first by turn or recency.
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<EventsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let world_id = WorldId::from(parse_uuid(&id_str)?);
    let limit = params.limit.unwrap_or(100).min(1000);
    let events = match params.turn {
        Some(turn) => state.store.events_for_turn(world_id, turn).await?,
        None => state.store.recent_events(world_id, limit).await?,
    };
    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

/// List a world's artifacts.
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let world_id = WorldId::from(parse_uuid(&id_str)?);
    let artifacts = state.store.list_artifacts(world_id).await?;
    Ok(Json(serde_json::json!({
        "count": artifacts.len(),
        "artifacts": artifacts,
    })))
}

/// List a world's chronicles, oldest first.
pub async fn list_chronicles(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let world_id = WorldId::from(parse_uuid(&id_str)?);
    let chronicles = state.store.list_chronicles(world_id).await?;
    Ok(Json(serde_json::json!({
        "count": chronicles.len(),
        "chronicles": chronicles,
    })))
}

/// Check the bearer token against the configured shared secret.
///
/// An empty configured secret refuses every caller rather than
/// accepting everyone.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if state.shared_secret.is_empty() {
        return Err(ApiError::Unauthorized);
    }
    let provided = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if provided == Some(state.shared_secret.as_str()) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

/// Parse a UUID from a path segment.
fn parse_uuid(s: &str) -> Result<Uuid, ApiError> {
    s.parse::<Uuid>()
        .map_err(|e| ApiError::InvalidUuid(format!("{s}: {e}")))
}
