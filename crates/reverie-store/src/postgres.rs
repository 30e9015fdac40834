//! `PostgreSQL` store backend.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time checked)
//! to avoid requiring a live database at build time. All queries are
//! parameterized. Enum columns are stored as text in their serde form;
//! trait sets, metadata maps, and chronicle lists are stored as JSONB.
//!
//! Event inserts use a multi-row UNNEST batch so a whole turn's log lands
//! in one round trip.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reverie_types::{
    Artifact, ArtifactKind, ArtifactStatus, Chronicle, Event, EventKind, Memory, Mind, MindId,
    MindStatus, PopulationSnapshot, Turn, TurnId, World, WorldId, WorldStatus,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::MindUpdate;

/// Default maximum number of connections in the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default connection timeout in seconds.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// `PostgreSQL` backend over a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to `PostgreSQL` and build the pool.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (used by tests with their own pool setup).
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Fetch a world by ID.
    pub async fn get_world(&self, id: WorldId) -> Result<Option<World>, StoreError> {
        let row = sqlx::query_as::<_, WorldRow>(
            r"SELECT id, name, status, turn_cadence_secs, max_active_minds, spawn_cost,
                     chaos_probability, current_turn, created_at
              FROM worlds WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        row.map(WorldRow::into_world).transpose()
    }

    /// Insert a new world.
    pub async fn insert_world(&self, world: &World) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO worlds (id, name, status, turn_cadence_secs, max_active_minds,
                                  spawn_cost, chaos_probability, current_turn, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(world.id.into_inner())
        .bind(&world.name)
        .bind(world_status_to_db(world.status))
        .bind(to_db_u64(world.turn_cadence_secs))
        .bind(to_db_u32(world.max_active_minds))
        .bind(to_db_u32(world.spawn_cost))
        .bind(world.chaos_probability)
        .bind(to_db_u64(world.current_turn))
        .bind(world.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List all worlds in creation order.
    pub async fn list_worlds(&self) -> Result<Vec<World>, StoreError> {
        let rows = sqlx::query_as::<_, WorldRow>(
            r"SELECT id, name, status, turn_cadence_secs, max_active_minds, spawn_cost,
                     chaos_probability, current_turn, created_at
              FROM worlds ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(WorldRow::into_world).collect()
    }

    /// Rewrite a world's mutable fields.
    pub async fn update_world(&self, world: &World) -> Result<(), StoreError> {
        sqlx::query(
            r"UPDATE worlds
              SET status = $2, turn_cadence_secs = $3, max_active_minds = $4,
                  spawn_cost = $5, chaos_probability = $6, current_turn = $7
              WHERE id = $1",
        )
        .bind(world.id.into_inner())
        .bind(world_status_to_db(world.status))
        .bind(to_db_u64(world.turn_cadence_secs))
        .bind(to_db_u32(world.max_active_minds))
        .bind(to_db_u32(world.spawn_cost))
        .bind(world.chaos_probability)
        .bind(to_db_u64(world.current_turn))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List a world's minds in creation order, optionally filtered by status.
    pub async fn list_minds(
        &self,
        world_id: WorldId,
        status: Option<MindStatus>,
    ) -> Result<Vec<Mind>, StoreError> {
        let rows = match status {
            Some(s) => {
                sqlx::query_as::<_, MindRow>(
                    r"SELECT id, world_id, name, generation, parent_id, traits, purpose,
                             energy, status, is_founder, lineage, born_at_turn, created_at
                      FROM minds WHERE world_id = $1 AND status = $2
                      ORDER BY created_at, id",
                )
                .bind(world_id.into_inner())
                .bind(mind_status_to_db(s))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MindRow>(
                    r"SELECT id, world_id, name, generation, parent_id, traits, purpose,
                             energy, status, is_founder, lineage, born_at_turn, created_at
                      FROM minds WHERE world_id = $1
                      ORDER BY created_at, id",
                )
                .bind(world_id.into_inner())
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(MindRow::into_mind).collect()
    }

    /// Insert a batch of new minds inside one transaction.
    pub async fn insert_minds(&self, minds: &[Mind]) -> Result<(), StoreError> {
        if minds.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for mind in minds {
            sqlx::query(
                r"INSERT INTO minds (id, world_id, name, generation, parent_id, traits,
                                     purpose, energy, status, is_founder, lineage,
                                     born_at_turn, created_at)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(mind.id.into_inner())
            .bind(mind.world_id.into_inner())
            .bind(&mind.name)
            .bind(to_db_u32(mind.generation))
            .bind(mind.parent_id.map(MindId::into_inner))
            .bind(serde_json::to_value(&mind.traits).unwrap_or_default())
            .bind(&mind.purpose)
            .bind(to_db_u32(mind.energy))
            .bind(mind_status_to_db(mind.status))
            .bind(mind.is_founder)
            .bind(&mind.lineage)
            .bind(to_db_u64(mind.born_at_turn))
            .bind(mind.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        tracing::debug!(count = minds.len(), "Inserted minds");
        Ok(())
    }

    /// Apply a batch of energy/status updates inside one transaction.
    pub async fn apply_mind_updates(&self, updates: &[MindUpdate]) -> Result<(), StoreError> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for update in updates {
            sqlx::query(r"UPDATE minds SET energy = $2, status = $3 WHERE id = $1")
                .bind(update.mind_id.into_inner())
                .bind(to_db_u32(update.energy))
                .bind(mind_status_to_db(update.status))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::debug!(count = updates.len(), "Applied mind updates");
        Ok(())
    }

    /// Insert an open turn record.
    pub async fn insert_turn(&self, turn: &Turn) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO turns (id, world_id, number, started_at, closed_at)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(turn.id.into_inner())
        .bind(turn.world_id.into_inner())
        .bind(to_db_u64(turn.number))
        .bind(turn.started_at)
        .bind(turn.closed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Close a turn by stamping its end time.
    pub async fn close_turn(
        &self,
        turn_id: TurnId,
        closed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(r"UPDATE turns SET closed_at = $2 WHERE id = $1")
            .bind(turn_id.into_inner())
            .bind(closed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetch a world's most recent turn record.
    pub async fn latest_turn(&self, world_id: WorldId) -> Result<Option<Turn>, StoreError> {
        let row = sqlx::query_as::<_, TurnRow>(
            r"SELECT id, world_id, number, started_at, closed_at
              FROM turns WHERE world_id = $1
              ORDER BY number DESC LIMIT 1",
        )
        .bind(world_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TurnRow::into_turn))
    }

    /// Batch-insert events using a multi-row UNNEST insert.
    pub async fn insert_events(&self, events: &[Event]) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        let len = events.len();
        let mut ids = Vec::with_capacity(len);
        let mut world_ids = Vec::with_capacity(len);
        let mut turn_numbers = Vec::with_capacity(len);
        let mut mind_ids: Vec<Option<Uuid>> = Vec::with_capacity(len);
        let mut kinds = Vec::with_capacity(len);
        let mut titles = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut metadata_arr = Vec::with_capacity(len);
        let mut timestamps = Vec::with_capacity(len);

        for event in events {
            ids.push(event.id.into_inner());
            world_ids.push(event.world_id.into_inner());
            turn_numbers.push(to_db_u64(event.turn_number));
            mind_ids.push(event.mind_id.map(MindId::into_inner));
            kinds.push(event_kind_to_db(event.kind).to_owned());
            titles.push(event.title.clone());
            contents.push(event.content.clone());
            metadata_arr.push(serde_json::to_value(&event.metadata).unwrap_or_default());
            timestamps.push(event.created_at);
        }

        sqlx::query(
            r"INSERT INTO events (id, world_id, turn_number, mind_id, kind, title, content, metadata, created_at)
              SELECT * FROM UNNEST($1::UUID[], $2::UUID[], $3::BIGINT[], $4::UUID[], $5::TEXT[], $6::TEXT[], $7::TEXT[], $8::JSONB[], $9::TIMESTAMPTZ[])",
        )
        .bind(&ids)
        .bind(&world_ids)
        .bind(&turn_numbers)
        .bind(&mind_ids)
        .bind(&kinds)
        .bind(&titles)
        .bind(&contents)
        .bind(&metadata_arr)
        .bind(&timestamps)
        .execute(&self.pool)
        .await?;

        tracing::debug!(count = len, "Inserted events (batch UNNEST)");
        Ok(())
    }

    /// Fetch the most recent `limit` events for a world, oldest first.
    pub async fn recent_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, world_id, turn_number, mind_id, kind, title, content, metadata, created_at
              FROM events WHERE world_id = $1
              ORDER BY turn_number DESC, id DESC LIMIT $2",
        )
        .bind(world_id.into_inner())
        .bind(limit_i64)
        .fetch_all(&self.pool)
        .await?;
        let mut events = rows
            .into_iter()
            .map(EventRow::into_event)
            .collect::<Result<Vec<_>, _>>()?;
        events.reverse();
        Ok(events)
    }

    /// Fetch the most recent non-heartbeat events, oldest first.
    pub async fn recent_substantive_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, world_id, turn_number, mind_id, kind, title, content, metadata, created_at
              FROM events WHERE world_id = $1
              AND metadata ->> 'marker' IS DISTINCT FROM $2
              ORDER BY turn_number DESC, id DESC LIMIT $3",
        )
        .bind(world_id.into_inner())
        .bind(Event::HEARTBEAT_MARKER)
        .bind(limit_i64)
        .fetch_all(&self.pool)
        .await?;
        let mut events = rows
            .into_iter()
            .map(EventRow::into_event)
            .collect::<Result<Vec<_>, _>>()?;
        events.reverse();
        Ok(events)
    }

    /// Fetch all events for a specific turn, oldest first.
    pub async fn events_for_turn(
        &self,
        world_id: WorldId,
        turn_number: u64,
    ) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, world_id, turn_number, mind_id, kind, title, content, metadata, created_at
              FROM events WHERE world_id = $1 AND turn_number = $2
              ORDER BY id",
        )
        .bind(world_id.into_inner())
        .bind(to_db_u64(turn_number))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(EventRow::into_event).collect()
    }

    /// Insert a batch of artifacts inside one transaction.
    pub async fn insert_artifacts(&self, artifacts: &[Artifact]) -> Result<(), StoreError> {
        if artifacts.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for artifact in artifacts {
            sqlx::query(
                r"INSERT INTO artifacts (id, world_id, creator_id, name, kind, content,
                                         origin_turn, last_referenced_turn, status)
                  VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(artifact.id.into_inner())
            .bind(artifact.world_id.into_inner())
            .bind(artifact.creator_id.into_inner())
            .bind(&artifact.name)
            .bind(artifact_kind_to_db(artifact.kind))
            .bind(&artifact.content)
            .bind(to_db_u64(artifact.origin_turn))
            .bind(to_db_u64(artifact.last_referenced_turn))
            .bind(artifact_status_to_db(artifact.status))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// List a world's artifacts in creation order.
    pub async fn list_artifacts(&self, world_id: WorldId) -> Result<Vec<Artifact>, StoreError> {
        let rows = sqlx::query_as::<_, ArtifactRow>(
            r"SELECT id, world_id, creator_id, name, kind, content, origin_turn,
                     last_referenced_turn, status
              FROM artifacts WHERE world_id = $1
              ORDER BY id",
        )
        .bind(world_id.into_inner())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ArtifactRow::into_artifact).collect()
    }

    /// Insert a batch of private memories inside one transaction.
    pub async fn insert_memories(&self, memories: &[Memory]) -> Result<(), StoreError> {
        if memories.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for memory in memories {
            sqlx::query(
                r"INSERT INTO memories (id, world_id, mind_id, turn_number, content, created_at)
                  VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(memory.id.into_inner())
            .bind(memory.world_id.into_inner())
            .bind(memory.mind_id.into_inner())
            .bind(to_db_u64(memory.turn_number))
            .bind(&memory.content)
            .bind(memory.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Fetch the most recent `limit` memories for one mind, oldest first.
    pub async fn recent_memories(
        &self,
        mind_id: MindId,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, MemoryRow>(
            r"SELECT id, world_id, mind_id, turn_number, content, created_at
              FROM memories WHERE mind_id = $1
              ORDER BY turn_number DESC, id DESC LIMIT $2",
        )
        .bind(mind_id.into_inner())
        .bind(limit_i64)
        .fetch_all(&self.pool)
        .await?;
        let mut memories: Vec<Memory> = rows.into_iter().map(MemoryRow::into_memory).collect();
        memories.reverse();
        Ok(memories)
    }

    /// Insert a chronicle.
    pub async fn insert_chronicle(&self, chronicle: &Chronicle) -> Result<(), StoreError> {
        sqlx::query(
            r"INSERT INTO chronicles (id, world_id, turn_number, headline, summary,
                                      key_events, dominant_concepts, population, created_at)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(chronicle.id.into_inner())
        .bind(chronicle.world_id.into_inner())
        .bind(to_db_u64(chronicle.turn_number))
        .bind(&chronicle.headline)
        .bind(&chronicle.summary)
        .bind(serde_json::to_value(&chronicle.key_events).unwrap_or_default())
        .bind(serde_json::to_value(&chronicle.dominant_concepts).unwrap_or_default())
        .bind(serde_json::to_value(chronicle.population).unwrap_or_default())
        .bind(chronicle.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a world's most recent chronicle.
    pub async fn latest_chronicle(
        &self,
        world_id: WorldId,
    ) -> Result<Option<Chronicle>, StoreError> {
        let row = sqlx::query_as::<_, ChronicleRow>(
            r"SELECT id, world_id, turn_number, headline, summary, key_events,
                     dominant_concepts, population, created_at
              FROM chronicles WHERE world_id = $1
              ORDER BY turn_number DESC LIMIT 1",
        )
        .bind(world_id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ChronicleRow::into_chronicle).transpose()
    }

    /// List a world's chronicles, oldest first.
    pub async fn list_chronicles(&self, world_id: WorldId) -> Result<Vec<Chronicle>, StoreError> {
        let rows = sqlx::query_as::<_, ChronicleRow>(
            r"SELECT id, world_id, turn_number, headline, summary, key_events,
                     dominant_concepts, population, created_at
              FROM chronicles WHERE world_id = $1
              ORDER BY turn_number",
        )
        .bind(world_id.into_inner())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ChronicleRow::into_chronicle).collect()
    }
}

// ---------------------------------------------------------------------------
// Row types and conversions
// ---------------------------------------------------------------------------

/// A row from the `worlds` table.
#[derive(Debug, sqlx::FromRow)]
struct WorldRow {
    id: Uuid,
    name: String,
    status: String,
    turn_cadence_secs: i64,
    max_active_minds: i32,
    spawn_cost: i32,
    chaos_probability: f64,
    current_turn: i64,
    created_at: DateTime<Utc>,
}

impl WorldRow {
    fn into_world(self) -> Result<World, StoreError> {
        Ok(World {
            id: WorldId::from(self.id),
            name: self.name,
            status: world_status_from_db(&self.status)?,
            turn_cadence_secs: from_db_u64(self.turn_cadence_secs),
            max_active_minds: from_db_u32(self.max_active_minds),
            spawn_cost: from_db_u32(self.spawn_cost),
            chaos_probability: self.chaos_probability,
            current_turn: from_db_u64(self.current_turn),
            created_at: self.created_at,
        })
    }
}

/// A row from the `minds` table.
#[derive(Debug, sqlx::FromRow)]
struct MindRow {
    id: Uuid,
    world_id: Uuid,
    name: String,
    generation: i32,
    parent_id: Option<Uuid>,
    traits: serde_json::Value,
    purpose: String,
    energy: i32,
    status: String,
    is_founder: bool,
    lineage: String,
    born_at_turn: i64,
    created_at: DateTime<Utc>,
}

impl MindRow {
    fn into_mind(self) -> Result<Mind, StoreError> {
        let traits: Vec<String> =
            serde_json::from_value(self.traits).map_err(|e| StoreError::Corrupt {
                collection: "minds",
                reason: format!("bad traits json: {e}"),
            })?;
        Ok(Mind {
            id: MindId::from(self.id),
            world_id: WorldId::from(self.world_id),
            name: self.name,
            generation: from_db_u32(self.generation),
            parent_id: self.parent_id.map(MindId::from),
            traits,
            purpose: self.purpose,
            energy: from_db_u32(self.energy),
            status: mind_status_from_db(&self.status)?,
            is_founder: self.is_founder,
            lineage: self.lineage,
            born_at_turn: from_db_u64(self.born_at_turn),
            created_at: self.created_at,
        })
    }
}

/// A row from the `turns` table.
#[derive(Debug, sqlx::FromRow)]
struct TurnRow {
    id: Uuid,
    world_id: Uuid,
    number: i64,
    started_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl TurnRow {
    fn into_turn(self) -> Turn {
        Turn {
            id: TurnId::from(self.id),
            world_id: WorldId::from(self.world_id),
            number: from_db_u64(self.number),
            started_at: self.started_at,
            closed_at: self.closed_at,
        }
    }
}

/// A row from the `events` table.
#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    world_id: Uuid,
    turn_number: i64,
    mind_id: Option<Uuid>,
    kind: String,
    title: String,
    content: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> Result<Event, StoreError> {
        let metadata = serde_json::from_value(self.metadata).map_err(|e| StoreError::Corrupt {
            collection: "events",
            reason: format!("bad metadata json: {e}"),
        })?;
        Ok(Event {
            id: reverie_types::EventId::from(self.id),
            world_id: WorldId::from(self.world_id),
            turn_number: from_db_u64(self.turn_number),
            mind_id: self.mind_id.map(MindId::from),
            kind: event_kind_from_db(&self.kind)?,
            title: self.title,
            content: self.content,
            metadata,
            created_at: self.created_at,
        })
    }
}

/// A row from the `artifacts` table.
#[derive(Debug, sqlx::FromRow)]
struct ArtifactRow {
    id: Uuid,
    world_id: Uuid,
    creator_id: Uuid,
    name: String,
    kind: String,
    content: String,
    origin_turn: i64,
    last_referenced_turn: i64,
    status: String,
}

impl ArtifactRow {
    fn into_artifact(self) -> Result<Artifact, StoreError> {
        Ok(Artifact {
            id: reverie_types::ArtifactId::from(self.id),
            world_id: WorldId::from(self.world_id),
            creator_id: MindId::from(self.creator_id),
            name: self.name,
            kind: artifact_kind_from_db(&self.kind)?,
            content: self.content,
            origin_turn: from_db_u64(self.origin_turn),
            last_referenced_turn: from_db_u64(self.last_referenced_turn),
            status: artifact_status_from_db(&self.status)?,
        })
    }
}

/// A row from the `memories` table.
#[derive(Debug, sqlx::FromRow)]
struct MemoryRow {
    id: Uuid,
    world_id: Uuid,
    mind_id: Uuid,
    turn_number: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl MemoryRow {
    fn into_memory(self) -> Memory {
        Memory {
            id: reverie_types::MemoryId::from(self.id),
            world_id: WorldId::from(self.world_id),
            mind_id: MindId::from(self.mind_id),
            turn_number: from_db_u64(self.turn_number),
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// A row from the `chronicles` table.
#[derive(Debug, sqlx::FromRow)]
struct ChronicleRow {
    id: Uuid,
    world_id: Uuid,
    turn_number: i64,
    headline: String,
    summary: String,
    key_events: serde_json::Value,
    dominant_concepts: serde_json::Value,
    population: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl ChronicleRow {
    fn into_chronicle(self) -> Result<Chronicle, StoreError> {
        let corrupt = |e: serde_json::Error| StoreError::Corrupt {
            collection: "chronicles",
            reason: e.to_string(),
        };
        let key_events: Vec<String> = serde_json::from_value(self.key_events).map_err(corrupt)?;
        let dominant_concepts: Vec<String> =
            serde_json::from_value(self.dominant_concepts).map_err(corrupt)?;
        let population: PopulationSnapshot =
            serde_json::from_value(self.population).map_err(corrupt)?;
        Ok(Chronicle {
            id: reverie_types::ChronicleId::from(self.id),
            world_id: WorldId::from(self.world_id),
            turn_number: from_db_u64(self.turn_number),
            headline: self.headline,
            summary: self.summary,
            key_events,
            dominant_concepts,
            population,
            created_at: self.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Enum <-> text column mapping
// ---------------------------------------------------------------------------

const fn world_status_to_db(status: WorldStatus) -> &'static str {
    match status {
        WorldStatus::Active => "active",
        WorldStatus::Paused => "paused",
        WorldStatus::Ended => "ended",
    }
}

fn world_status_from_db(s: &str) -> Result<WorldStatus, StoreError> {
    match s {
        "active" => Ok(WorldStatus::Active),
        "paused" => Ok(WorldStatus::Paused),
        "ended" => Ok(WorldStatus::Ended),
        other => Err(StoreError::Corrupt {
            collection: "worlds",
            reason: format!("unknown world status: {other}"),
        }),
    }
}

const fn mind_status_to_db(status: MindStatus) -> &'static str {
    match status {
        MindStatus::Active => "active",
        MindStatus::Inactive => "inactive",
    }
}

fn mind_status_from_db(s: &str) -> Result<MindStatus, StoreError> {
    match s {
        "active" => Ok(MindStatus::Active),
        "inactive" => Ok(MindStatus::Inactive),
        other => Err(StoreError::Corrupt {
            collection: "minds",
            reason: format!("unknown mind status: {other}"),
        }),
    }
}

const fn event_kind_to_db(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Speech => "speech",
        EventKind::Action => "action",
        EventKind::Spawn => "spawn",
        EventKind::System => "system",
    }
}

fn event_kind_from_db(s: &str) -> Result<EventKind, StoreError> {
    match s {
        "speech" => Ok(EventKind::Speech),
        "action" => Ok(EventKind::Action),
        "spawn" => Ok(EventKind::Spawn),
        "system" => Ok(EventKind::System),
        other => Err(StoreError::Corrupt {
            collection: "events",
            reason: format!("unknown event kind: {other}"),
        }),
    }
}

const fn artifact_kind_to_db(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Concept => "concept",
        ArtifactKind::Institution => "institution",
        ArtifactKind::Symbol => "symbol",
        ArtifactKind::Place => "place",
    }
}

fn artifact_kind_from_db(s: &str) -> Result<ArtifactKind, StoreError> {
    match s {
        "concept" => Ok(ArtifactKind::Concept),
        "institution" => Ok(ArtifactKind::Institution),
        "symbol" => Ok(ArtifactKind::Symbol),
        "place" => Ok(ArtifactKind::Place),
        other => Err(StoreError::Corrupt {
            collection: "artifacts",
            reason: format!("unknown artifact kind: {other}"),
        }),
    }
}

const fn artifact_status_to_db(status: ArtifactStatus) -> &'static str {
    match status {
        ArtifactStatus::Emerging => "emerging",
        ArtifactStatus::Contested => "contested",
        ArtifactStatus::Canonized => "canonized",
        ArtifactStatus::Forgotten => "forgotten",
        ArtifactStatus::Mythic => "mythic",
    }
}

fn artifact_status_from_db(s: &str) -> Result<ArtifactStatus, StoreError> {
    match s {
        "emerging" => Ok(ArtifactStatus::Emerging),
        "contested" => Ok(ArtifactStatus::Contested),
        "canonized" => Ok(ArtifactStatus::Canonized),
        "forgotten" => Ok(ArtifactStatus::Forgotten),
        "mythic" => Ok(ArtifactStatus::Mythic),
        other => Err(StoreError::Corrupt {
            collection: "artifacts",
            reason: format!("unknown artifact status: {other}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Integer column helpers (database columns are signed)
// ---------------------------------------------------------------------------

fn to_db_u64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn from_db_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn to_db_u32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn from_db_u32(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}
