//! In-memory store backend.
//!
//! Holds every collection in `BTreeMap`s behind a single `tokio` `RwLock`.
//! Used by the engine's property tests and by local development without a
//! database. Creation order is preserved by keeping insertion-ordered
//! vectors alongside the keyed maps.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reverie_types::{
    Artifact, Chronicle, Event, Memory, Mind, MindId, MindStatus, Turn, TurnId, World, WorldId,
};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::MindUpdate;

/// All collections, guarded together so multi-collection flushes are
/// observed atomically by readers.
#[derive(Debug, Default)]
struct Collections {
    worlds: BTreeMap<WorldId, World>,
    /// Minds in insertion order; creation order is the iteration order.
    minds: Vec<Mind>,
    turns: Vec<Turn>,
    events: Vec<Event>,
    artifacts: Vec<Artifact>,
    memories: Vec<Memory>,
    chronicles: Vec<Chronicle>,
}

/// In-memory backend for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a world by ID.
    pub async fn get_world(&self, id: WorldId) -> Result<Option<World>, StoreError> {
        Ok(self.inner.read().await.worlds.get(&id).cloned())
    }

    /// Insert a new world.
    pub async fn insert_world(&self, world: &World) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .worlds
            .insert(world.id, world.clone());
        Ok(())
    }

    /// List all worlds in creation order.
    pub async fn list_worlds(&self) -> Result<Vec<World>, StoreError> {
        let inner = self.inner.read().await;
        let mut worlds: Vec<World> = inner.worlds.values().cloned().collect();
        worlds.sort_by_key(|w| w.created_at);
        Ok(worlds)
    }

    /// Rewrite a world record.
    pub async fn update_world(&self, world: &World) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .worlds
            .insert(world.id, world.clone());
        Ok(())
    }

    /// List a world's minds in creation order, optionally filtered by status.
    pub async fn list_minds(
        &self,
        world_id: WorldId,
        status: Option<MindStatus>,
    ) -> Result<Vec<Mind>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .minds
            .iter()
            .filter(|m| m.world_id == world_id)
            .filter(|m| status.is_none_or(|s| m.status == s))
            .cloned()
            .collect())
    }

    /// Insert a batch of new minds.
    pub async fn insert_minds(&self, minds: &[Mind]) -> Result<(), StoreError> {
        self.inner.write().await.minds.extend_from_slice(minds);
        Ok(())
    }

    /// Apply a batch of energy/status updates.
    pub async fn apply_mind_updates(&self, updates: &[MindUpdate]) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        for update in updates {
            if let Some(mind) = inner.minds.iter_mut().find(|m| m.id == update.mind_id) {
                mind.energy = update.energy;
                mind.status = update.status;
            }
        }
        Ok(())
    }

    /// Insert an open turn record.
    pub async fn insert_turn(&self, turn: &Turn) -> Result<(), StoreError> {
        self.inner.write().await.turns.push(turn.clone());
        Ok(())
    }

    /// Close a turn by stamping its end time.
    pub async fn close_turn(
        &self,
        turn_id: TurnId,
        closed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(turn) = inner.turns.iter_mut().find(|t| t.id == turn_id) {
            turn.closed_at = Some(closed_at);
        }
        Ok(())
    }

    /// Fetch a world's most recent turn record.
    pub async fn latest_turn(&self, world_id: WorldId) -> Result<Option<Turn>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .turns
            .iter()
            .filter(|t| t.world_id == world_id)
            .max_by_key(|t| t.number)
            .cloned())
    }

    /// Insert a batch of events.
    pub async fn insert_events(&self, events: &[Event]) -> Result<(), StoreError> {
        self.inner.write().await.events.extend_from_slice(events);
        Ok(())
    }

    /// Fetch the most recent `limit` events for a world, oldest first.
    pub async fn recent_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().await;
        let mut recent: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.world_id == world_id)
            .rev()
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    /// Fetch the most recent non-heartbeat events, oldest first.
    ///
    /// Heartbeats are skipped before the limit applies, so the window
    /// always holds `limit` substantive events when that many exist.
    pub async fn recent_substantive_events(
        &self,
        world_id: WorldId,
        limit: usize,
    ) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().await;
        let mut recent: Vec<Event> = inner
            .events
            .iter()
            .filter(|e| e.world_id == world_id && !e.is_heartbeat())
            .rev()
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    /// Fetch all events for a specific turn, oldest first.
    pub async fn events_for_turn(
        &self,
        world_id: WorldId,
        turn_number: u64,
    ) -> Result<Vec<Event>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.world_id == world_id && e.turn_number == turn_number)
            .cloned()
            .collect())
    }

    /// Insert a batch of artifacts.
    pub async fn insert_artifacts(&self, artifacts: &[Artifact]) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .artifacts
            .extend_from_slice(artifacts);
        Ok(())
    }

    /// List a world's artifacts in creation order.
    pub async fn list_artifacts(&self, world_id: WorldId) -> Result<Vec<Artifact>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .iter()
            .filter(|a| a.world_id == world_id)
            .cloned()
            .collect())
    }

    /// Insert a batch of private memories.
    pub async fn insert_memories(&self, memories: &[Memory]) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .memories
            .extend_from_slice(memories);
        Ok(())
    }

    /// Fetch the most recent `limit` memories for one mind, oldest first.
    pub async fn recent_memories(
        &self,
        mind_id: MindId,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError> {
        let inner = self.inner.read().await;
        let mut recent: Vec<Memory> = inner
            .memories
            .iter()
            .filter(|m| m.mind_id == mind_id)
            .rev()
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    /// Insert a chronicle.
    pub async fn insert_chronicle(&self, chronicle: &Chronicle) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .chronicles
            .push(chronicle.clone());
        Ok(())
    }

    /// Fetch a world's most recent chronicle.
    pub async fn latest_chronicle(
        &self,
        world_id: WorldId,
    ) -> Result<Option<Chronicle>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chronicles
            .iter()
            .filter(|c| c.world_id == world_id)
            .max_by_key(|c| c.turn_number)
            .cloned())
    }

    /// List a world's chronicles, oldest first.
    pub async fn list_chronicles(&self, world_id: WorldId) -> Result<Vec<Chronicle>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chronicles
            .iter()
            .filter(|c| c.world_id == world_id)
            .cloned()
            .collect())
    }
}
