//! Durable collection store for the Reverie simulation.
//!
//! The engine treats persistence as a generic transactional collection store
//! over the World/Mind/Turn/Event/Artifact/Memory/Chronicle records. Two
//! backends exist:
//!
//! - [`MemoryStore`] -- in-process maps behind a `tokio` lock, used by tests
//!   and local development.
//! - [`PgStore`] -- `PostgreSQL` via `sqlx`, used in deployment.
//!
//! [`Store`] dispatches between them with an enum rather than a trait object
//! because async methods are not dyn-compatible.
//!
//! # Modules
//!
//! - [`error`] -- Shared [`StoreError`] type
//! - [`memory`] -- In-memory backend
//! - [`postgres`] -- `PostgreSQL` backend with batch inserts

pub mod error;
pub mod memory;
pub mod postgres;

use chrono::{DateTime, Utc};
use reverie_types::{
    Artifact, Chronicle, Event, Memory, Mind, MindId, MindStatus, Turn, TurnId, World, WorldId,
};

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A batched update to one mind's mutable state.
///
/// Energy and status are the only fields the turn engine ever rewrites;
/// identity, traits, and lineage are immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MindUpdate {
    /// The mind to update.
    pub mind_id: MindId,
    /// The committed energy after debit and regeneration.
    pub energy: u32,
    /// The committed activation status.
    pub status: MindStatus,
}

/// The durable store, dispatching to a concrete backend.
#[derive(Debug, Clone)]
pub enum Store {
    /// In-memory backend for tests and local development.
    Memory(MemoryStore),
    /// `PostgreSQL` backend.
    Postgres(PgStore),
}

impl Store {
    /// Create a store backed by in-process memory.
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    /// Fetch a world by ID.
    pub async fn get_world(&self, id: WorldId) -> Result<Option<World>, StoreError> {
        match self {
            Self::Memory(s) => s.get_world(id).await,
            Self::Postgres(s) => s.get_world(id).await,
        }
    }

    /// Insert a new world.
    pub async fn insert_world(&self, world: &World) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_world(world).await,
            Self::Postgres(s) => s.insert_world(world).await,
        }
    }

    /// List all worlds in creation order.
    pub async fn list_worlds(&self) -> Result<Vec<World>, StoreError> {
        match self {
            Self::Memory(s) => s.list_worlds().await,
            Self::Postgres(s) => s.list_worlds().await,
        }
    }

    /// Rewrite a world record (status, current turn).
    pub async fn update_world(&self, world: &World) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.update_world(world).await,
            Self::Postgres(s) => s.update_world(world).await,
        }
    }

    /// List a world's minds in stable creation order, optionally filtered
    /// by status.
    pub async fn list_minds(
        &self,
        world_id: WorldId,
        status: Option<MindStatus>,
    ) -> Result<Vec<Mind>, StoreError> {
        match self {
            Self::Memory(s) => s.list_minds(world_id, status).await,
            Self::Postgres(s) => s.list_minds(world_id, status).await,
        }
    }

    /// Insert a batch of new minds.
    pub async fn insert_minds(&self, minds: &[Mind]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_minds(minds).await,
            Self::Postgres(s) => s.insert_minds(minds).await,
        }
    }

    /// Apply a batch of energy/status updates.
    pub async fn apply_mind_updates(&self, updates: &[MindUpdate]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.apply_mind_updates(updates).await,
            Self::Postgres(s) => s.apply_mind_updates(updates).await,
        }
    }

    /// Insert an open turn record.
    pub async fn insert_turn(&self, turn: &Turn) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_turn(turn).await,
            Self::Postgres(s) => s.insert_turn(turn).await,
        }
    }

    /// Close a turn by stamping its end time.
    pub async fn close_turn(
        &self,
        turn_id: TurnId,
        closed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.close_turn(turn_id, closed_at).await,
            Self::Postgres(s) => s.close_turn(turn_id, closed_at).await,
        }
    }

    /// Fetch a world's most recent turn record, open or closed.
    pub async fn latest_turn(&self, world_id: WorldId) -> Result<Option<Turn>, StoreError> {
        match self {
            Self::Memory(s) => s.latest_turn(world_id).await,
            Self::Postgres(s) => s.latest_turn(world_id).await,
        }
    }

    /// Insert a batch of events.
    pub async fn insert_events(&self, events: &[Event]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_events(events).await,
            Self::Postgres(s) => s.insert_events(events).await,
        }
    }

    /// Fetch the most recent `limit` events for a world, oldest first.
    pub async fn recent_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        match self {
            Self::Memory(s) => s.recent_events(world_id, limit).await,
            Self::Postgres(s) => s.recent_events(world_id, limit).await,
        }
    }

    /// Fetch the most recent `limit` non-heartbeat events, oldest first.
    pub async fn recent_substantive_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        match self {
            Self::Memory(s) => s.recent_substantive_events(world_id, limit).await,
            Self::Postgres(s) => s.recent_substantive_events(world_id, limit).await,
        }
    }

    /// Fetch all events for a specific turn, oldest first.
    pub async fn events_for_turn(
        &self,
        world_id: WorldId,
        turn_number: u64,
    ) -> Result<Vec<Event>, StoreError> {
        match self {
            Self::Memory(s) => s.events_for_turn(world_id, turn_number).await,
            Self::Postgres(s) => s.events_for_turn(world_id, turn_number).await,
        }
    }

    /// Insert a batch of artifacts.
    pub async fn insert_artifacts(&self, artifacts: &[Artifact]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_artifacts(artifacts).await,
            Self::Postgres(s) => s.insert_artifacts(artifacts).await,
        }
    }

    /// List a world's artifacts in creation order.
    pub async fn list_artifacts(&self, world_id: WorldId) -> Result<Vec<Artifact>, StoreError> {
        match self {
            Self::Memory(s) => s.list_artifacts(world_id).await,
            Self::Postgres(s) => s.list_artifacts(world_id).await,
        }
    }

    /// Insert a batch of private memories.
    pub async fn insert_memories(&self, memories: &[Memory]) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_memories(memories).await,
            Self::Postgres(s) => s.insert_memories(memories).await,
        }
    }

    /// Fetch the most recent `limit` memories for one mind, oldest first.
    ///
    /// Memories are private: callers must only surface them to their
    /// owning mind.
    pub async fn recent_memories(
        &self,
        mind_id: MindId,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError> {
        match self {
            Self::Memory(s) => s.recent_memories(mind_id, limit).await,
            Self::Postgres(s) => s.recent_memories(mind_id, limit).await,
        }
    }

    /// Insert a chronicle.
    pub async fn insert_chronicle(&self, chronicle: &Chronicle) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.insert_chronicle(chronicle).await,
            Self::Postgres(s) => s.insert_chronicle(chronicle).await,
        }
    }

    /// Fetch a world's most recent chronicle.
    pub async fn latest_chronicle(
        &self,
        world_id: WorldId,
    ) -> Result<Option<Chronicle>, StoreError> {
        match self {
            Self::Memory(s) => s.latest_chronicle(world_id).await,
            Self::Postgres(s) => s.latest_chronicle(world_id).await,
        }
    }

    /// List a world's chronicles, oldest first.
    pub async fn list_chronicles(&self, world_id: WorldId) -> Result<Vec<Chronicle>, StoreError> {
        match self {
            Self::Memory(s) => s.list_chronicles(world_id).await,
            Self::Postgres(s) => s.list_chronicles(world_id).await,
        }
    }
}
