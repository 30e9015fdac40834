//! Core entity structs persisted in the durable store.
//!
//! These records mirror the store collections one-to-one. Narrative fields
//! (`title`, `content`) and machine-readable fields (`metadata`) are kept
//! separate everywhere so the human-readable log and the audit trail never
//! collapse into one field.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ArtifactKind, ArtifactStatus, EventKind, MindStatus, WorldStatus};
use crate::ids::{ArtifactId, ChronicleId, EventId, MemoryId, MindId, TurnId, WorldId};

/// Hard upper bound on a mind's energy.
pub const ENERGY_MAX: u32 = 100;

/// A world: one persistent simulation with its own population and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Unique identifier.
    pub id: WorldId,
    /// Human-readable world name.
    pub name: String,
    /// Lifecycle status; only `Active` worlds accept turn advances.
    pub status: WorldStatus,
    /// Minimum seconds between closing one turn and opening the next.
    pub turn_cadence_secs: u64,
    /// Maximum number of active minds, enforced at spawn-commit time.
    pub max_active_minds: u32,
    /// Energy debited from a parent when it spawns a child.
    pub spawn_cost: u32,
    /// Per-turn probability of one ambient chaos event, in `[0.0, 1.0]`.
    pub chaos_probability: f64,
    /// Number of the most recently closed turn (0 before the first turn).
    pub current_turn: u64,
    /// When the world was created.
    pub created_at: DateTime<Utc>,
}

/// A mind: an autonomous agent with identity, traits, energy, and lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mind {
    /// Unique identifier.
    pub id: MindId,
    /// The world this mind belongs to.
    pub world_id: WorldId,
    /// The mind's name, visible to other minds.
    pub name: String,
    /// Generation number: 0 for founders, parent generation + 1 otherwise.
    pub generation: u32,
    /// Parent mind. `None` only for founders.
    pub parent_id: Option<MindId>,
    /// Bounded trait set describing the mind's character.
    pub traits: Vec<String>,
    /// The purpose the mind was created with.
    pub purpose: String,
    /// Current energy, always in `[0, ENERGY_MAX]`.
    pub energy: u32,
    /// Activation status; inactive minds are never processed again.
    pub status: MindStatus,
    /// Whether this mind is a generation-0 founder.
    pub is_founder: bool,
    /// Lineage tag inherited from the founding ancestor.
    pub lineage: String,
    /// The turn on which this mind came into being (0 for founders seeded
    /// before the first turn).
    pub born_at_turn: u64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// One discrete simulation step processing all active minds once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique identifier.
    pub id: TurnId,
    /// The world this turn belongs to.
    pub world_id: WorldId,
    /// Sequence number, starting at 1.
    pub number: u64,
    /// When the turn opened.
    pub started_at: DateTime<Utc>,
    /// When the turn closed. `None` while the turn is open (or if it failed
    /// before closing).
    pub closed_at: Option<DateTime<Utc>>,
}

/// An entry in the structured event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// The world this event belongs to.
    pub world_id: WorldId,
    /// The turn on which the event occurred.
    pub turn_number: u64,
    /// The mind the event is attributed to. `None` for ambient system events.
    pub mind_id: Option<MindId>,
    /// Event discriminant.
    pub kind: EventKind,
    /// Short narrative title.
    pub title: String,
    /// Narrative prose, readable by minds in future contexts.
    pub content: String,
    /// Machine-readable parameters, kept separate from the narrative.
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Metadata key marking the mandatory per-turn heartbeat event.
    pub const HEARTBEAT_MARKER: &'static str = "heartbeat";

    /// Whether this event is the per-turn heartbeat marker.
    ///
    /// Heartbeats guarantee every turn leaves at least one event behind;
    /// they are excluded from chronicle input and context windows.
    pub fn is_heartbeat(&self) -> bool {
        self.metadata
            .get("marker")
            .and_then(serde_json::Value::as_str)
            == Some(Self::HEARTBEAT_MARKER)
    }
}

/// A durable named creation referenced by later turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique identifier.
    pub id: ArtifactId,
    /// The world this artifact belongs to.
    pub world_id: WorldId,
    /// The mind that created the artifact.
    pub creator_id: MindId,
    /// The artifact's name.
    pub name: String,
    /// Category, fixed by the creating action.
    pub kind: ArtifactKind,
    /// Narrative description of the artifact.
    pub content: String,
    /// The turn on which the artifact was created.
    pub origin_turn: u64,
    /// The most recent turn that referenced the artifact.
    pub last_referenced_turn: u64,
    /// Cultural standing.
    pub status: ArtifactStatus,
}

/// A private reflection, visible only to its owning mind in future turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier.
    pub id: MemoryId,
    /// The world this memory belongs to.
    pub world_id: WorldId,
    /// The mind that owns the memory.
    pub mind_id: MindId,
    /// The turn on which the reflection was recorded.
    pub turn_number: u64,
    /// The reflection text.
    pub content: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Population counts captured when a chronicle is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Active minds at the end of the turn.
    pub active: u32,
    /// Minds spawned during the turn.
    pub births: u32,
    /// Minds that faded during the turn.
    pub fades: u32,
}

/// A per-turn narrative digest, distinct from the raw event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chronicle {
    /// Unique identifier.
    pub id: ChronicleId,
    /// The world this chronicle belongs to.
    pub world_id: WorldId,
    /// The turn this chronicle summarizes.
    pub turn_number: u64,
    /// One-line headline for the turn.
    pub headline: String,
    /// Multi-paragraph narrative summary.
    pub summary: String,
    /// Ordered list of the turn's key events.
    pub key_events: Vec<String>,
    /// Concepts that dominated the turn.
    pub dominant_concepts: Vec<String>,
    /// Population counts at chronicle time.
    pub population: PopulationSnapshot,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(metadata: BTreeMap<String, serde_json::Value>) -> Event {
        Event {
            id: EventId::new(),
            world_id: WorldId::new(),
            turn_number: 1,
            mind_id: None,
            kind: EventKind::System,
            title: String::from("test"),
            content: String::from("test event"),
            metadata,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn heartbeat_detection() {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            String::from("marker"),
            serde_json::Value::from(Event::HEARTBEAT_MARKER),
        );
        assert!(sample_event(metadata).is_heartbeat());
    }

    #[test]
    fn ordinary_event_is_not_heartbeat() {
        assert!(!sample_event(BTreeMap::new()).is_heartbeat());

        let mut metadata = BTreeMap::new();
        metadata.insert(String::from("marker"), serde_json::Value::from("other"));
        assert!(!sample_event(metadata).is_heartbeat());
    }

    #[test]
    fn mind_serde_round_trip() {
        let mind = Mind {
            id: MindId::new(),
            world_id: WorldId::new(),
            name: String::from("Aster"),
            generation: 2,
            parent_id: Some(MindId::new()),
            traits: vec![String::from("curious"), String::from("stubborn")],
            purpose: String::from("to map the unmapped"),
            energy: 60,
            status: MindStatus::Active,
            is_founder: false,
            lineage: String::from("aster-line"),
            born_at_turn: 4,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&mind).unwrap_or_default();
        let back: Result<Mind, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(mind));
    }
}
