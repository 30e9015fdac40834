//! End-to-end turn behavior against the in-memory store.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use reverie_engine::config::{FounderSeed, MechanicsConfig};
use reverie_engine::lifecycle::create_founder;
use reverie_engine::oracle::{Oracle, OracleError, ScriptedOracle, SilentOracle};
use reverie_engine::turn::{run_turn, TurnError};
use reverie_engine::MindContext;
use reverie_store::Store;
use reverie_types::{
    ChronicleDraft, EventKind, Mind, MindAction, MindDecision, MindStatus, World, WorldId,
    WorldStatus,
};

struct FailingOracle;

impl Oracle for FailingOracle {
    async fn decide(&self, _context: &MindContext) -> Result<Option<MindDecision>, OracleError> {
        Err(OracleError::Backend(String::from("connection refused")))
    }

    async fn chronicle(
        &self,
        _request: &reverie_engine::chronicle::ChronicleRequest,
    ) -> Result<Option<ChronicleDraft>, OracleError> {
        Err(OracleError::Backend(String::from("connection refused")))
    }
}

fn test_world(max_active_minds: u32, chaos_probability: f64) -> World {
    World {
        id: WorldId::new(),
        name: String::from("Proving Ground"),
        status: WorldStatus::Active,
        turn_cadence_secs: 0,
        max_active_minds,
        spawn_cost: 25,
        chaos_probability,
        current_turn: 0,
        created_at: chrono::Utc::now(),
    }
}

fn founder(world_id: WorldId, name: &str) -> Mind {
    create_founder(
        world_id,
        &FounderSeed {
            name: name.to_owned(),
            traits: vec![String::from("curious")],
            purpose: String::from("to begin"),
        },
    )
}

fn fixed_cfg() -> MechanicsConfig {
    MechanicsConfig {
        regen_min: 0,
        regen_max: 0,
        fade_probability: 0.0,
        trait_replace_probability: 0.0,
        trait_append_probability: 0.0,
        ..MechanicsConfig::default()
    }
}

fn spawn_decision(name: &str) -> Option<MindDecision> {
    Some(MindDecision {
        speech: String::new(),
        actions: vec![MindAction::SpawnMind {
            name: name.to_owned(),
            traits: vec![String::from("gentle")],
            purpose: String::from("to continue"),
        }],
        private_thought: String::new(),
    })
}

async fn seed(world: &World, founders: &[Mind]) -> Store {
    let store = Store::memory();
    store.insert_world(world).await.unwrap();
    store.insert_minds(founders).await.unwrap();
    store
}

#[tokio::test]
async fn two_founders_each_spawn_a_child() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster"), founder(world.id, "Briar")];
    let store = seed(&world, &founders).await;
    let oracle = ScriptedOracle::new(vec![spawn_decision("Cypress"), spawn_decision("Dell")]);
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &oracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    assert_eq!(report.turn_number, 1);
    assert_eq!(report.minds_processed, 2);
    assert_eq!(report.births, 2);
    assert_eq!(report.fades, 0);

    let minds = store.list_minds(world.id, None).await.unwrap();
    assert_eq!(minds.len(), 4);
    // Zero regen keeps energy arithmetic exact.
    let aster = minds.iter().find(|m| m.name == "Aster").unwrap();
    assert_eq!(aster.energy, 75);
    let cypress = minds.iter().find(|m| m.name == "Cypress").unwrap();
    assert_eq!(cypress.energy, fixed_cfg().child_baseline_energy);
    assert_eq!(cypress.generation, 1);
    assert_eq!(cypress.born_at_turn, 1);

    let updated = store.get_world(world.id).await.unwrap().unwrap();
    assert_eq!(updated.current_turn, 1);
}

#[tokio::test]
async fn population_cap_counts_spawns_within_the_turn() {
    // Two founders, cap 3: only the first spawn fits.
    let world = test_world(3, 0.0);
    let founders = vec![founder(world.id, "Aster"), founder(world.id, "Briar")];
    let store = seed(&world, &founders).await;
    let oracle = ScriptedOracle::new(vec![spawn_decision("Cypress"), spawn_decision("Dell")]);
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &oracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    assert_eq!(report.births, 1);
    let minds = store.list_minds(world.id, Some(MindStatus::Active)).await.unwrap();
    assert_eq!(minds.len(), 3);
    assert!(minds.iter().any(|m| m.name == "Cypress"));
    assert!(!minds.iter().any(|m| m.name == "Dell"));
    // The second founder attempted a spawn but paid nothing.
    let briar = minds.iter().find(|m| m.name == "Briar").unwrap();
    assert_eq!(briar.energy, 100);
}

#[tokio::test]
async fn only_three_actions_of_five_execute() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let actions: Vec<MindAction> = (1..=5)
        .map(|i| MindAction::DeclareConcept {
            name: format!("concept-{i}"),
            content: format!("the {i}th idea"),
        })
        .collect();
    let oracle = ScriptedOracle::new(vec![Some(MindDecision {
        speech: String::new(),
        actions,
        private_thought: String::new(),
    })]);
    let mut rng = StdRng::seed_from_u64(11);

    run_turn(&store, &oracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    let artifacts = store.list_artifacts(world.id).await.unwrap();
    assert_eq!(artifacts.len(), 3);
    let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["concept-1", "concept-2", "concept-3"]);
}

#[tokio::test]
async fn empty_turn_records_silence_without_consulting_the_chronicler() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &SilentOracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    assert_eq!(report.chronicle_headline.as_deref(), Some("Silence"));
    // The heartbeat is the only event and does not count as substance.
    assert_eq!(report.events, 1);
    let events = store.events_for_turn(world.id, 1).await.unwrap();
    assert_eq!(events.len(), 1);
    assert!(events.first().unwrap().is_heartbeat());

    let chronicle = store.latest_chronicle(world.id).await.unwrap().unwrap();
    assert!(chronicle.key_events.is_empty());
    assert_eq!(chronicle.population.active, 1);
}

#[tokio::test]
async fn chaos_probability_one_adds_exactly_one_system_event() {
    let world = test_world(50, 1.0);
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &SilentOracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    // Heartbeat plus one chaos event.
    assert_eq!(report.events, 2);
    let events = store.events_for_turn(world.id, 1).await.unwrap();
    let chaos: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::System && !e.is_heartbeat())
        .collect();
    assert_eq!(chaos.len(), 1);
    assert_eq!(chaos.first().unwrap().mind_id, None);
    // A chronicler that yields nothing leaves the turn unchronicled.
    assert_eq!(report.chronicle_headline, None);
    assert!(store.latest_chronicle(world.id).await.unwrap().is_none());
}

#[tokio::test]
async fn oracle_failure_never_aborts_the_turn() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster"), founder(world.id, "Briar")];
    let store = seed(&world, &founders).await;
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &FailingOracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    assert_eq!(report.minds_processed, 2);
    let updated = store.get_world(world.id).await.unwrap().unwrap();
    assert_eq!(updated.current_turn, 1);
}

#[tokio::test]
async fn faded_minds_are_excluded_from_later_turns() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster"), founder(world.id, "Briar")];
    let store = seed(&world, &founders).await;
    let cfg = MechanicsConfig {
        fade_probability: 1.0,
        ..fixed_cfg()
    };
    let mut rng = StdRng::seed_from_u64(11);

    // Both minds silent with certain fading: everyone goes.
    let first = run_turn(&store, &SilentOracle, &cfg, world.id, &mut rng)
        .await
        .unwrap();
    assert_eq!(first.fades, 2);

    let active = store.list_minds(world.id, Some(MindStatus::Active)).await.unwrap();
    assert!(active.is_empty());
    let all = store.list_minds(world.id, None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|m| m.status == MindStatus::Inactive));

    // The next turn processes nobody and records Silence.
    let second = run_turn(&store, &SilentOracle, &cfg, world.id, &mut rng)
        .await
        .unwrap();
    assert_eq!(second.minds_processed, 0);
    assert_eq!(second.fades, 0);
    assert_eq!(second.chronicle_headline.as_deref(), Some("Silence"));
}

#[tokio::test]
async fn energy_never_exceeds_the_maximum() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let cfg = MechanicsConfig {
        regen_min: 5,
        regen_max: 5,
        fade_probability: 0.0,
        ..MechanicsConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(11);

    // Speaking costs nothing; the founder starts full and regenerates.
    let oracle = ScriptedOracle::new(vec![Some(MindDecision {
        speech: String::from("I am still here."),
        actions: Vec::new(),
        private_thought: String::new(),
    })]);
    run_turn(&store, &oracle, &cfg, world.id, &mut rng)
        .await
        .unwrap();

    let minds = store.list_minds(world.id, None).await.unwrap();
    assert_eq!(minds.first().unwrap().energy, reverie_types::ENERGY_MAX);
}

#[tokio::test]
async fn cadence_rejects_a_premature_second_turn() {
    let mut world = test_world(50, 0.0);
    world.turn_cadence_secs = 3600;
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let mut rng = StdRng::seed_from_u64(11);

    run_turn(&store, &SilentOracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();
    let second = run_turn(&store, &SilentOracle, &fixed_cfg(), world.id, &mut rng).await;

    match second {
        Err(TurnError::Cooldown { retry_after_secs }) => {
            assert!(retry_after_secs > 0 && retry_after_secs <= 3600);
        }
        other => panic!("expected cooldown, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_and_inactive_worlds_are_rejected() {
    let store = Store::memory();
    let mut rng = StdRng::seed_from_u64(11);
    let missing = run_turn(&store, &SilentOracle, &fixed_cfg(), WorldId::new(), &mut rng).await;
    assert!(matches!(missing, Err(TurnError::WorldNotFound(_))));

    let mut world = test_world(50, 0.0);
    world.status = WorldStatus::Paused;
    store.insert_world(&world).await.unwrap();
    let paused = run_turn(&store, &SilentOracle, &fixed_cfg(), world.id, &mut rng).await;
    assert!(matches!(paused, Err(TurnError::WorldNotActive(_))));
}

#[tokio::test]
async fn scripted_chronicle_draft_is_recorded() {
    let world = test_world(50, 0.0);
    let founders = vec![founder(world.id, "Aster")];
    let store = seed(&world, &founders).await;
    let oracle = ScriptedOracle::new(vec![Some(MindDecision {
        speech: String::from("Let there be a name for this place."),
        actions: Vec::new(),
        private_thought: String::from("No one else will remember this moment."),
    })])
    .with_chronicle(ChronicleDraft {
        headline: String::from("The First Naming"),
        summary: String::from("Aster spoke, and the world listened."),
        key_events: vec![String::from("Aster spoke")],
        dominant_concepts: vec![String::from("naming")],
    });
    let mut rng = StdRng::seed_from_u64(11);

    let report = run_turn(&store, &oracle, &fixed_cfg(), world.id, &mut rng)
        .await
        .unwrap();

    assert_eq!(report.chronicle_headline.as_deref(), Some("The First Naming"));
    let chronicle = store.latest_chronicle(world.id).await.unwrap().unwrap();
    assert_eq!(chronicle.turn_number, 1);
    assert_eq!(chronicle.dominant_concepts, vec![String::from("naming")]);

    // The private thought became a memory, not an event.
    let memories = store.recent_memories(founders[0].id, 10).await.unwrap();
    assert_eq!(memories.len(), 1);
    let events = store.events_for_turn(world.id, 1).await.unwrap();
    assert!(events
        .iter()
        .all(|e| !e.content.contains("No one else will remember")));
}
