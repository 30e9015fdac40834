//! Chronicle assembly: turning a turn's event batch into a narrative record.
//!
//! The chronicle is written from the turn's own events only, never from a
//! wider window. A turn in which nothing happened beyond the heartbeat is
//! recorded as a Silence chronicle without consulting the oracle at all.

use chrono::Utc;
use reverie_types::{
    Chronicle, ChronicleDraft, ChronicleId, Event, EventKind, PopulationSnapshot, WorldId,
};
use serde::Serialize;

/// Aggregate counts for one turn, computed from the turn's event batch and
/// population bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct TurnStats {
    /// The turn being chronicled.
    pub turn_number: u64,
    /// Speech events in the batch.
    pub speeches: u32,
    /// Action events in the batch.
    pub actions: u32,
    /// Spawn events in the batch.
    pub spawns: u32,
    /// Population accounting at turn close.
    pub population: PopulationSnapshot,
}

/// Input handed to the oracle's chronicler: a readable transcript of the
/// turn plus its aggregate stats.
#[derive(Debug, Clone, Serialize)]
pub struct ChronicleRequest {
    /// The turn's events rendered as readable lines, heartbeat excluded.
    pub transcript: String,
    /// Aggregate counts for the turn.
    pub stats: TurnStats,
}

/// Compute aggregate stats from a turn's event batch.
pub fn compute_stats(
    events: &[Event],
    turn_number: u64,
    population: PopulationSnapshot,
) -> TurnStats {
    let mut stats = TurnStats {
        turn_number,
        speeches: 0,
        actions: 0,
        spawns: 0,
        population,
    };
    for event in events {
        if event.is_heartbeat() {
            continue;
        }
        match event.kind {
            EventKind::Speech => stats.speeches = stats.speeches.saturating_add(1),
            EventKind::Action => stats.actions = stats.actions.saturating_add(1),
            EventKind::Spawn => stats.spawns = stats.spawns.saturating_add(1),
            EventKind::System => {}
        }
    }
    stats
}

/// Whether the batch holds anything worth chronicling. The heartbeat does
/// not count.
pub fn has_substance(events: &[Event]) -> bool {
    events.iter().any(|e| !e.is_heartbeat())
}

/// Render the turn's events as one readable transcript for the chronicler.
/// The heartbeat is excluded.
pub fn build_transcript(events: &[Event]) -> String {
    let mut lines = Vec::new();
    for event in events {
        if event.is_heartbeat() {
            continue;
        }
        if event.content.is_empty() {
            lines.push(event.title.clone());
        } else {
            lines.push(format!("{}: {}", event.title, event.content));
        }
    }
    lines.join("\n")
}

/// The chronicle recorded for a turn with no substantive events.
pub fn silence_chronicle(
    world_id: WorldId,
    turn_number: u64,
    population: PopulationSnapshot,
) -> Chronicle {
    Chronicle {
        id: ChronicleId::new(),
        world_id,
        turn_number,
        headline: String::from("Silence"),
        summary: String::from("Nothing stirred. The world held its breath and waited."),
        key_events: Vec::new(),
        dominant_concepts: Vec::new(),
        population,
        created_at: Utc::now(),
    }
}

/// Build the stored chronicle from an oracle draft.
pub fn from_draft(
    world_id: WorldId,
    turn_number: u64,
    population: PopulationSnapshot,
    draft: ChronicleDraft,
) -> Chronicle {
    Chronicle {
        id: ChronicleId::new(),
        world_id,
        turn_number,
        headline: draft.headline,
        summary: draft.summary,
        key_events: draft.key_events,
        dominant_concepts: draft.dominant_concepts,
        population,
        created_at: Utc::now(),
    }
}
