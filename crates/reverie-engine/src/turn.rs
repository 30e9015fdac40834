//! The turn orchestrator: one full pass over a world's active minds.
//!
//! A turn runs as a phase pipeline. All domain state is computed in memory
//! and flushed to the store at exactly two points: the population commit
//! (new minds plus energy/status updates) and the turn close (events,
//! artifacts, memories, chronicle, world counter).
//!
//! The population snapshot taken at load is what every mind perceives;
//! admission control against the population cap runs against the live
//! spawn budget instead, so two parents cannot both slip a child past the
//! cap in the same turn.

use chrono::Utc;
use rand::rngs::StdRng;
use reverie_store::{MindUpdate, Store, StoreError};
use reverie_types::{
    Event, EventId, EventKind, Mind, MindStatus, PopulationSnapshot, Turn, TurnId, World,
    WorldId, WorldStatus,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::chaos::roll_chaos;
use crate::chronicle::{
    build_transcript, compute_stats, from_draft, has_substance, silence_chronicle,
    ChronicleRequest,
};
use crate::config::MechanicsConfig;
use crate::context::build_context;
use crate::effects::{apply_decision, MindEffects, SpawnBudget};
use crate::lifecycle::{fade_event, settle_mind};
use crate::oracle::Oracle;

/// Errors that abort a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    /// No world with the given id exists.
    #[error("world {0} not found")]
    WorldNotFound(WorldId),

    /// The world exists but is not accepting turns.
    #[error("world {0} is not active")]
    WorldNotActive(WorldId),

    /// The turn cadence has not elapsed since the previous turn.
    #[error("turn cadence not elapsed, retry in {retry_after_secs}s")]
    Cooldown {
        /// Seconds until the next turn is permitted.
        retry_after_secs: u64,
    },

    /// The durable store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Summary of a completed turn, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TurnReport {
    /// The turn that was run.
    pub turn_number: u64,
    /// How many minds were processed from the snapshot.
    pub minds_processed: u32,
    /// How many events the turn produced, heartbeat included.
    pub events: u32,
    /// Minds spawned this turn.
    pub births: u32,
    /// Minds that faded this turn.
    pub fades: u32,
    /// Headline of the turn's chronicle, if one was written.
    pub chronicle_headline: Option<String>,
}

/// Everything a turn accumulates before the close flush.
#[derive(Debug, Default)]
struct TurnBatch {
    events: Vec<Event>,
    artifacts: Vec<reverie_types::Artifact>,
    memories: Vec<reverie_types::Memory>,
    children: Vec<Mind>,
    updates: Vec<MindUpdate>,
    fades: u32,
}

/// Run one complete turn for a world.
///
/// # Errors
///
/// Returns [`TurnError::Cooldown`] when called before the world's cadence
/// has elapsed, and propagates store failures. A failing oracle never
/// aborts the turn: the affected mind is treated as silent.
pub async fn run_turn<O: Oracle>(
    store: &Store,
    oracle: &O,
    cfg: &MechanicsConfig,
    world_id: WorldId,
    rng: &mut StdRng,
) -> Result<TurnReport, TurnError> {
    let mut world = store
        .get_world(world_id)
        .await?
        .ok_or(TurnError::WorldNotFound(world_id))?;
    if world.status != WorldStatus::Active {
        return Err(TurnError::WorldNotActive(world_id));
    }
    check_cooldown(store, &world).await?;

    let turn_number = world.current_turn.saturating_add(1);
    let turn = Turn {
        id: TurnId::new(),
        world_id,
        number: turn_number,
        started_at: Utc::now(),
        closed_at: None,
    };
    store.insert_turn(&turn).await?;
    info!(world = %world.name, turn = turn_number, "Turn opened");

    // Load phase: one frozen snapshot shared by every mind this turn.
    let snapshot = store.list_minds(world_id, Some(MindStatus::Active)).await?;
    let window_size = cfg.recent_event_window.saturating_add(cfg.blur_event_window);
    let window = store
        .recent_substantive_events(world_id, window_size)
        .await?;
    let prior_chronicle = store.latest_chronicle(world_id).await?;

    let mut batch = TurnBatch::default();
    batch.events.push(heartbeat_event(world_id, turn_number));

    let population_at_start = u32::try_from(snapshot.len()).unwrap_or(u32::MAX);
    let mut budget = SpawnBudget::new(population_at_start);

    for mind in &snapshot {
        process_mind(
            store,
            oracle,
            cfg,
            &world,
            mind,
            &snapshot,
            &window,
            prior_chronicle.as_ref(),
            turn_number,
            &mut budget,
            &mut batch,
            rng,
        )
        .await?;
    }

    // Population commit: children and energy/status updates land together.
    store.insert_minds(&batch.children).await?;
    store.apply_mind_updates(&batch.updates).await?;

    if let Some(event) = roll_chaos(world_id, turn_number, world.chaos_probability, rng) {
        batch.events.push(event);
    }

    let births = u32::try_from(batch.children.len()).unwrap_or(u32::MAX);
    let population = PopulationSnapshot {
        active: population_at_start
            .saturating_sub(batch.fades)
            .saturating_add(births),
        births,
        fades: batch.fades,
    };

    let chronicle = write_chronicle(oracle, &world, turn_number, &batch.events, population).await;

    // Close flush: every narrative record lands, then the turn seals.
    store.insert_events(&batch.events).await?;
    store.insert_artifacts(&batch.artifacts).await?;
    store.insert_memories(&batch.memories).await?;
    let chronicle_headline = match chronicle {
        Some(c) => {
            store.insert_chronicle(&c).await?;
            Some(c.headline)
        }
        None => None,
    };
    world.current_turn = turn_number;
    store.update_world(&world).await?;
    store.close_turn(turn.id, Utc::now()).await?;

    let report = TurnReport {
        turn_number,
        minds_processed: population_at_start,
        events: u32::try_from(batch.events.len()).unwrap_or(u32::MAX),
        births,
        fades: batch.fades,
        chronicle_headline,
    };
    info!(
        world = %world.name,
        turn = turn_number,
        events = report.events,
        births = report.births,
        fades = report.fades,
        "Turn closed"
    );
    Ok(report)
}

/// Reject the turn if the world's cadence has not elapsed since the
/// previous turn. An open turn left by a crashed run counts from its
/// start time.
async fn check_cooldown(store: &Store, world: &World) -> Result<(), TurnError> {
    let Some(previous) = store.latest_turn(world.id).await? else {
        return Ok(());
    };
    let reference = previous.closed_at.unwrap_or(previous.started_at);
    let elapsed = Utc::now()
        .signed_duration_since(reference)
        .num_seconds()
        .max(0);
    let elapsed = u64::try_from(elapsed).unwrap_or(0);
    if elapsed < world.turn_cadence_secs {
        return Err(TurnError::Cooldown {
            retry_after_secs: world.turn_cadence_secs.saturating_sub(elapsed),
        });
    }
    Ok(())
}

/// Process one mind from the snapshot: context, decision, effects,
/// settlement. Oracle failures degrade to silence; store failures abort.
#[allow(clippy::too_many_arguments)]
async fn process_mind<O: Oracle>(
    store: &Store,
    oracle: &O,
    cfg: &MechanicsConfig,
    world: &World,
    mind: &Mind,
    snapshot: &[Mind],
    window: &[Event],
    prior_chronicle: Option<&reverie_types::Chronicle>,
    turn_number: u64,
    budget: &mut SpawnBudget,
    batch: &mut TurnBatch,
    rng: &mut StdRng,
) -> Result<(), TurnError> {
    let memories = store
        .recent_memories(mind.id, cfg.memory_context_limit)
        .await?;
    let context = build_context(
        mind,
        snapshot,
        window,
        &memories,
        prior_chronicle,
        turn_number,
        cfg,
    );

    let decision = match oracle.decide(&context).await {
        Ok(d) => d,
        Err(error) => {
            warn!(mind = %mind.name, %error, "Oracle failed, treating mind as silent");
            None
        }
    };

    let silent = decision.as_ref().is_none_or(reverie_types::MindDecision::is_silent);
    let effects = match &decision {
        Some(d) => apply_decision(mind, d, world, cfg, turn_number, budget, rng),
        None => MindEffects::default(),
    };
    debug!(
        mind = %mind.name,
        events = effects.events.len(),
        children = effects.children.len(),
        debit = effects.energy_debit,
        silent,
        "Mind processed"
    );

    let settlement = settle_mind(mind.energy, effects.energy_debit, silent, cfg, rng);
    if settlement.faded {
        batch.events.push(fade_event(mind, turn_number));
        batch.fades = batch.fades.saturating_add(1);
    }
    batch.updates.push(MindUpdate {
        mind_id: mind.id,
        energy: settlement.committed_energy,
        status: if settlement.faded {
            MindStatus::Inactive
        } else {
            MindStatus::Active
        },
    });

    batch.events.extend(effects.events);
    batch.artifacts.extend(effects.artifacts);
    batch.memories.extend(effects.memories);
    batch.children.extend(effects.children);
    Ok(())
}

/// Build the turn's chronicle. An empty turn (heartbeat only) records
/// Silence without an oracle call; a failing chronicler leaves no
/// chronicle at all.
async fn write_chronicle<O: Oracle>(
    oracle: &O,
    world: &World,
    turn_number: u64,
    events: &[Event],
    population: PopulationSnapshot,
) -> Option<reverie_types::Chronicle> {
    if !has_substance(events) {
        return Some(silence_chronicle(world.id, turn_number, population));
    }

    let request = ChronicleRequest {
        transcript: build_transcript(events),
        stats: compute_stats(events, turn_number, population),
    };
    match oracle.chronicle(&request).await {
        Ok(Some(draft)) => Some(from_draft(world.id, turn_number, population, draft)),
        Ok(None) => {
            warn!(turn = turn_number, "Chronicler returned nothing, turn closes unchronicled");
            None
        }
        Err(error) => {
            warn!(turn = turn_number, %error, "Chronicler failed, turn closes unchronicled");
            None
        }
    }
}

/// The mandatory per-turn heartbeat event.
fn heartbeat_event(world_id: WorldId, turn_number: u64) -> Event {
    let mut metadata = std::collections::BTreeMap::new();
    metadata.insert(
        String::from("marker"),
        serde_json::Value::String(Event::HEARTBEAT_MARKER.to_owned()),
    );
    Event {
        id: EventId::new(),
        world_id,
        turn_number,
        mind_id: None,
        kind: EventKind::System,
        title: String::from("The world turns"),
        content: String::new(),
        metadata,
        created_at: Utc::now(),
    }
}
