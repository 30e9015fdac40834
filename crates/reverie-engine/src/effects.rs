//! Effect processing: applying one mind's decision under the domain rules.
//!
//! The processor consumes at most [`MAX_ACTIONS_PER_DECISION`] actions;
//! anything beyond that is dropped without an event or an error. Minds have
//! no error channel at all: a spawn that fails its preconditions simply
//! never happens.
//!
//! Every effect writes narrative prose into `Event.content` and structured
//! parameters into `Event.metadata`, kept distinct so the readable log and
//! the machine audit trail never collapse into one field.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use reverie_types::{
    Artifact, ArtifactId, ArtifactStatus, Event, EventId, EventKind, Memory, MemoryId, Mind,
    MindAction, MindDecision, MindId, MindStatus, World, MAX_ACTIONS_PER_DECISION,
};
use tracing::debug;

use crate::config::MechanicsConfig;

/// The pool of trait words mutation draws replacements and additions from.
const TRAIT_POOL: [&str; 24] = [
    "curious", "patient", "restless", "gentle", "fierce", "solemn", "playful", "wary",
    "devoted", "stubborn", "dreaming", "exacting", "generous", "secretive", "bold",
    "melancholy", "radiant", "cunning", "tender", "unyielding", "wandering", "watchful",
    "reverent", "wry",
];

/// The single-writer population accumulator threaded through the per-mind
/// loop. Admission control reads the live total; nothing outside the
/// running turn may touch it.
#[derive(Debug, Clone, Copy)]
pub struct SpawnBudget {
    /// Active population at turn start (the frozen snapshot size).
    pub population_at_start: u32,
    /// Children committed so far this turn.
    pub spawned: u32,
}

impl SpawnBudget {
    /// Create a budget for a turn starting with the given population.
    pub const fn new(population_at_start: u32) -> Self {
        Self {
            population_at_start,
            spawned: 0,
        }
    }

    /// Whether one more spawn fits under the world's cap.
    const fn admits(&self, max_active_minds: u32) -> bool {
        self.population_at_start.saturating_add(self.spawned) < max_active_minds
    }
}

/// Everything one mind's decision produced, accumulated in memory for the
/// batched phase commits.
#[derive(Debug, Default)]
pub struct MindEffects {
    /// Events to append to the turn's log.
    pub events: Vec<Event>,
    /// Artifacts created by the decision.
    pub artifacts: Vec<Artifact>,
    /// Private memories recorded by the decision.
    pub memories: Vec<Memory>,
    /// Children spawned by the decision.
    pub children: Vec<Mind>,
    /// Total energy debited from the acting mind this turn.
    pub energy_debit: u32,
}

/// Apply a decision's declared effects for one mind.
///
/// Excess actions beyond [`MAX_ACTIONS_PER_DECISION`] are dropped
/// silently. Spawn preconditions (energy, population cap) are checked
/// against the live budget; failures are dropped silently.
pub fn apply_decision(
    mind: &Mind,
    decision: &MindDecision,
    world: &World,
    cfg: &MechanicsConfig,
    turn_number: u64,
    budget: &mut SpawnBudget,
    rng: &mut impl Rng,
) -> MindEffects {
    let mut effects = MindEffects::default();

    let speech = decision.speech.trim();
    if !speech.is_empty() {
        effects.events.push(speech_event(mind, turn_number, speech));
    }

    for action in decision.actions.iter().take(MAX_ACTIONS_PER_DECISION) {
        match action {
            MindAction::SpawnMind {
                name,
                traits,
                purpose,
            } => {
                apply_spawn(
                    mind,
                    name,
                    traits,
                    purpose,
                    world,
                    cfg,
                    turn_number,
                    budget,
                    rng,
                    &mut effects,
                );
            }
            MindAction::DeclareConcept { name, content }
            | MindAction::BuildStructure { name, content }
            | MindAction::CreateObject { name, content }
            | MindAction::EstablishPlace { name, content } => {
                apply_creation(mind, action, name, content, turn_number, &mut effects);
            }
        }
    }

    let thought = decision.private_thought.trim();
    if !thought.is_empty() {
        effects.memories.push(Memory {
            id: MemoryId::new(),
            world_id: mind.world_id,
            mind_id: mind.id,
            turn_number,
            content: thought.to_owned(),
            created_at: Utc::now(),
        });
    }

    effects
}

/// Attempt one spawn under the energy and population preconditions.
#[allow(clippy::too_many_arguments)]
fn apply_spawn(
    parent: &Mind,
    name: &str,
    proposed_traits: &[String],
    purpose: &str,
    world: &World,
    cfg: &MechanicsConfig,
    turn_number: u64,
    budget: &mut SpawnBudget,
    rng: &mut impl Rng,
    effects: &mut MindEffects,
) {
    let remaining_energy = parent.energy.saturating_sub(effects.energy_debit);
    if remaining_energy < world.spawn_cost {
        debug!(parent = %parent.name, "Spawn dropped: insufficient energy");
        return;
    }
    if !budget.admits(world.max_active_minds) {
        debug!(parent = %parent.name, "Spawn dropped: population cap reached");
        return;
    }

    let traits = mutate_traits(proposed_traits, &parent.traits, cfg, rng);
    let child = Mind {
        id: MindId::new(),
        world_id: parent.world_id,
        name: name.to_owned(),
        generation: parent.generation.saturating_add(1),
        parent_id: Some(parent.id),
        traits,
        purpose: purpose.to_owned(),
        energy: cfg.child_baseline_energy.min(reverie_types::ENERGY_MAX),
        status: MindStatus::Active,
        is_founder: false,
        lineage: parent.lineage.clone(),
        born_at_turn: turn_number,
        created_at: Utc::now(),
    };

    let mut metadata = BTreeMap::new();
    metadata.insert(String::from("child_id"), json_str(&child.id.to_string()));
    metadata.insert(String::from("child_name"), json_str(&child.name));
    metadata.insert(
        String::from("generation"),
        serde_json::Value::from(child.generation),
    );
    metadata.insert(
        String::from("traits"),
        serde_json::to_value(&child.traits).unwrap_or_default(),
    );

    effects.events.push(Event {
        id: EventId::new(),
        world_id: parent.world_id,
        turn_number,
        mind_id: Some(parent.id),
        kind: EventKind::Spawn,
        title: format!("{} brings forth {}", parent.name, child.name),
        content: format!(
            "{} gathers what remains of themselves and shapes a new mind, {}, \
             of the {} line. Its purpose: {}.",
            parent.name, child.name, child.lineage, child.purpose
        ),
        metadata,
        created_at: Utc::now(),
    });

    effects.children.push(child);
    effects.energy_debit = effects.energy_debit.saturating_add(world.spawn_cost);
    budget.spawned = budget.spawned.saturating_add(1);
}

/// Apply one of the four artifact-producing actions.
fn apply_creation(
    mind: &Mind,
    action: &MindAction,
    name: &str,
    content: &str,
    turn_number: u64,
    effects: &mut MindEffects,
) {
    let Some(kind) = action.artifact_kind() else {
        return;
    };

    let artifact = Artifact {
        id: ArtifactId::new(),
        world_id: mind.world_id,
        creator_id: mind.id,
        name: name.to_owned(),
        kind,
        content: content.to_owned(),
        origin_turn: turn_number,
        last_referenced_turn: turn_number,
        status: ArtifactStatus::Emerging,
    };

    let verb = match kind {
        reverie_types::ArtifactKind::Concept => "declares the concept",
        reverie_types::ArtifactKind::Institution => "raises the structure",
        reverie_types::ArtifactKind::Symbol => "creates the object",
        reverie_types::ArtifactKind::Place => "establishes the place",
    };

    let mut metadata = BTreeMap::new();
    metadata.insert(
        String::from("artifact_id"),
        json_str(&artifact.id.to_string()),
    );
    metadata.insert(String::from("artifact_name"), json_str(name));
    metadata.insert(
        String::from("artifact_kind"),
        serde_json::to_value(kind).unwrap_or_default(),
    );

    effects.events.push(Event {
        id: EventId::new(),
        world_id: mind.world_id,
        turn_number,
        mind_id: Some(mind.id),
        kind: EventKind::Action,
        title: format!("{} {verb} '{name}'", mind.name),
        content: content.to_owned(),
        metadata,
        created_at: Utc::now(),
    });

    effects.artifacts.push(artifact);
}

/// Build a speech event.
fn speech_event(mind: &Mind, turn_number: u64, speech: &str) -> Event {
    Event {
        id: EventId::new(),
        world_id: mind.world_id,
        turn_number,
        mind_id: Some(mind.id),
        kind: EventKind::Speech,
        title: format!("{} speaks", mind.name),
        content: speech.to_owned(),
        metadata: BTreeMap::new(),
        created_at: Utc::now(),
    }
}

/// Mutate a proposed child trait set.
///
/// Each proposed trait is independently replaced with probability
/// `trait_replace_probability` by a pool trait the child does not already
/// carry; then with probability `trait_append_probability` one extra
/// unused trait is appended while the set is under `trait_cap`. The
/// parent's traits count as used so a replacement never trivially
/// reintroduces inheritance. The result never exceeds the cap.
pub fn mutate_traits(
    proposed: &[String],
    parent_traits: &[String],
    cfg: &MechanicsConfig,
    rng: &mut impl Rng,
) -> Vec<String> {
    let mut traits: Vec<String> = proposed
        .iter()
        .take(cfg.trait_cap)
        .cloned()
        .collect();

    for index in 0..traits.len() {
        if rng.random_bool(cfg.trait_replace_probability) {
            let used = used_traits(&traits, parent_traits);
            if let Some(replacement) = pick_unused(&used, rng)
                && let Some(slot) = traits.get_mut(index)
            {
                *slot = replacement;
            }
        }
    }

    if traits.len() < cfg.trait_cap
        && rng.random_bool(cfg.trait_append_probability)
        && let Some(extra) = pick_unused(&traits, rng)
    {
        traits.push(extra);
    }

    traits
}

/// The set of trait words considered "used" during a replacement roll:
/// every trait the child currently carries plus the parent's own set.
fn used_traits(current: &[String], parent_traits: &[String]) -> Vec<String> {
    let mut used: Vec<String> = current.to_vec();
    used.extend(parent_traits.iter().cloned());
    used
}

/// Pick a random pool trait not already in `used`, if any remain.
fn pick_unused(used: &[String], rng: &mut impl Rng) -> Option<String> {
    let available: Vec<&str> = TRAIT_POOL
        .iter()
        .copied()
        .filter(|t| !used.iter().any(|u| u == t))
        .collect();
    if available.is_empty() {
        return None;
    }
    let index = rng.random_range(0..available.len());
    available.get(index).map(|t| (*t).to_owned())
}

fn json_str(s: &str) -> serde_json::Value {
    serde_json::Value::String(s.to_owned())
}
