//! Ambient chaos: rare world-authored events that seed the narrative.
//!
//! At most one chaos event may occur per turn, rolled after all minds have
//! been processed. Chaos is pure narrative input: it carries no mechanical
//! payload and touches no mind state.

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use reverie_types::{Event, EventId, EventKind, WorldId};
use tracing::info;

/// The fixed repertoire of ambient occurrences.
const AMBIENCE: [(&str, &str); 8] = [
    (
        "A color without a name",
        "For one long moment the sky takes on a color no mind has words for, then lets it go.",
    ),
    (
        "The ground hums",
        "A low hum rises from beneath everything, holds a single note, and subsides.",
    ),
    (
        "Rain of light",
        "Motes of pale light drift down like slow rain and dissolve wherever they land.",
    ),
    (
        "An echo returns",
        "Something said long ago comes back faintly, worn smooth by distance.",
    ),
    (
        "The horizon folds",
        "Far off, the horizon creases like paper before smoothing itself flat again.",
    ),
    (
        "A second shadow",
        "For part of the day every shape casts two shadows, one of them pointing the wrong way.",
    ),
    (
        "Stillness",
        "All ambient motion stops at once, and the silence has a texture to it.",
    ),
    (
        "A door that was not there",
        "In a place everyone knows well there is, briefly, a door. No one opens it.",
    ),
];

/// Roll for this turn's chaos event. Returns at most one event.
pub fn roll_chaos(
    world_id: WorldId,
    turn_number: u64,
    probability: f64,
    rng: &mut impl Rng,
) -> Option<Event> {
    if probability <= 0.0 || !rng.random_bool(probability.min(1.0)) {
        return None;
    }

    let index = rng.random_range(0..AMBIENCE.len());
    let (title, content) = AMBIENCE.get(index).copied()?;
    info!(turn = turn_number, title, "Chaos event");

    let mut metadata = BTreeMap::new();
    metadata.insert(
        String::from("source"),
        serde_json::Value::String(String::from("chaos")),
    );
    Some(Event {
        id: EventId::new(),
        world_id,
        turn_number,
        mind_id: None,
        kind: EventKind::System,
        title: title.to_owned(),
        content: content.to_owned(),
        metadata,
        created_at: Utc::now(),
    })
}
