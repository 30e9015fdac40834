//! Population lifecycle: energy settlement, fading, and founder creation.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use reverie_types::{
    Event, EventId, EventKind, Mind, MindId, MindStatus, WorldId, ENERGY_MAX,
};
use tracing::info;

use crate::config::{FounderSeed, MechanicsConfig};

/// The outcome of settling one mind's energy at end of turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// Energy to commit, already clamped to `[0, ENERGY_MAX]`.
    pub committed_energy: u32,
    /// Whether the mind fades this turn.
    pub faded: bool,
}

/// Settle one mind's energy for the turn and roll for fading.
///
/// The committed value is the net of the turn's debits and a regeneration
/// roll, clamped to `[0, ENERGY_MAX]` and written exactly once. Only a
/// mind that did nothing and said nothing this turn rolls for fading,
/// with probability `fade_probability`; energy never triggers the roll.
pub fn settle_mind(
    energy: u32,
    debit: u32,
    silent: bool,
    cfg: &MechanicsConfig,
    rng: &mut impl Rng,
) -> Settlement {
    let regen = if cfg.regen_min >= cfg.regen_max {
        cfg.regen_min
    } else {
        rng.random_range(cfg.regen_min..=cfg.regen_max)
    };
    let committed_energy = energy
        .saturating_sub(debit)
        .saturating_add(regen)
        .min(ENERGY_MAX);

    let faded = silent && rng.random_bool(cfg.fade_probability);

    Settlement {
        committed_energy,
        faded,
    }
}

/// The system event recorded when a mind fades.
pub fn fade_event(mind: &Mind, turn_number: u64) -> Event {
    info!(mind = %mind.name, turn = turn_number, "Mind fades");
    let mut metadata = BTreeMap::new();
    metadata.insert(
        String::from("mind_id"),
        serde_json::Value::String(mind.id.to_string()),
    );
    metadata.insert(
        String::from("generation"),
        serde_json::Value::from(mind.generation),
    );
    Event {
        id: EventId::new(),
        world_id: mind.world_id,
        turn_number,
        mind_id: Some(mind.id),
        kind: EventKind::System,
        title: format!("{} fades", mind.name),
        content: format!(
            "{} grows quiet, then still, and is gone. The {} line remembers.",
            mind.name, mind.lineage
        ),
        metadata,
        created_at: Utc::now(),
    }
}

/// Build a generation-0 founder from a seed entry. Founders start at full
/// energy and carry their own name, lowercased, as lineage.
pub fn create_founder(world_id: WorldId, seed: &FounderSeed) -> Mind {
    Mind {
        id: MindId::new(),
        world_id,
        name: seed.name.clone(),
        generation: 0,
        parent_id: None,
        traits: seed.traits.clone(),
        purpose: seed.purpose.clone(),
        energy: ENERGY_MAX,
        status: MindStatus::Active,
        is_founder: true,
        lineage: seed.name.to_lowercase(),
        born_at_turn: 0,
        created_at: Utc::now(),
    }
}
