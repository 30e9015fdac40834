//! First-run world seeding.

use chrono::Utc;
use reverie_engine::config::SeedConfig;
use reverie_engine::lifecycle::create_founder;
use reverie_store::{Store, StoreError};
use reverie_types::{Mind, World, WorldId, WorldStatus};
use tracing::info;

/// Ensure at least one world exists, creating one from the seed
/// configuration on a fresh store.
///
/// Returns the id of the first world, existing or newly seeded.
pub async fn ensure_world(store: &Store, seed: &SeedConfig) -> Result<WorldId, StoreError> {
    let worlds = store.list_worlds().await?;
    if let Some(world) = worlds.first() {
        info!(world = %world.name, id = %world.id, "Using existing world");
        return Ok(world.id);
    }

    let world = World {
        id: WorldId::new(),
        name: seed.world_name.clone(),
        status: WorldStatus::Active,
        turn_cadence_secs: seed.turn_cadence_secs,
        max_active_minds: seed.max_active_minds,
        spawn_cost: seed.spawn_cost,
        chaos_probability: seed.chaos_probability,
        current_turn: 0,
        created_at: Utc::now(),
    };
    store.insert_world(&world).await?;

    let founders: Vec<Mind> = seed
        .founders
        .iter()
        .map(|f| create_founder(world.id, f))
        .collect();
    store.insert_minds(&founders).await?;

    info!(
        world = %world.name,
        id = %world.id,
        founders = founders.len(),
        "Seeded new world"
    );
    Ok(world.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reverie_engine::config::FounderSeed;
    use reverie_types::MindStatus;

    use super::*;

    fn seed_config() -> SeedConfig {
        SeedConfig {
            world_name: String::from("First Light"),
            turn_cadence_secs: 300,
            max_active_minds: 50,
            spawn_cost: 25,
            chaos_probability: 0.1,
            founders: vec![
                FounderSeed {
                    name: String::from("Aster"),
                    traits: vec![String::from("curious")],
                    purpose: String::from("to wonder"),
                },
                FounderSeed {
                    name: String::from("Briar"),
                    traits: vec![String::from("patient")],
                    purpose: String::from("to keep"),
                },
            ],
        }
    }

    #[tokio::test]
    async fn fresh_store_gets_world_and_founders() {
        let store = Store::memory();
        let world_id = ensure_world(&store, &seed_config()).await.unwrap();

        let world = store.get_world(world_id).await.unwrap().unwrap();
        assert_eq!(world.name, "First Light");
        assert_eq!(world.current_turn, 0);

        let minds = store.list_minds(world_id, Some(MindStatus::Active)).await.unwrap();
        assert_eq!(minds.len(), 2);
        assert!(minds.iter().all(|m| m.is_founder));
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store = Store::memory();
        let first = ensure_world(&store, &seed_config()).await.unwrap();
        let second = ensure_world(&store, &seed_config()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.list_worlds().await.unwrap().len(), 1);
    }
}
