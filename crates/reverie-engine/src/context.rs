//! Per-mind context assembly: the bounded view of the world a mind
//! perceives before deciding.
//!
//! Context building is deterministic and side-effect-free. Given the same
//! frozen turn-start state it always produces the same [`MindContext`].
//! Minds perceive only narrative state: names, events, memories, and the
//! prior chronicle. Mechanical state (energy, caps, mutation rates, window
//! sizes) never appears here, which is what keeps the observed and
//! governing views of the world structurally separate.

use std::collections::BTreeMap;

use reverie_types::{Chronicle, Event, EventKind, Memory, Mind, MindId};
use serde::Serialize;

use crate::config::MechanicsConfig;

/// Attribution used for events whose author no longer appears in the
/// active population snapshot.
const FADED_AUTHOR: &str = "a faded mind";

/// Attribution used for ambient system events.
const WORLD_AUTHOR: &str = "the world itself";

/// The fixed menu of actions presented to every mind, with the JSON shape
/// the oracle must return for each.
pub const ACTION_MENU: [&str; 5] = [
    "spawn_mind -- bring a new mind into being: {\"type\": \"spawn_mind\", \"name\": \"...\", \"traits\": [\"...\"], \"purpose\": \"...\"}",
    "declare_concept -- name an idea into the shared vocabulary: {\"type\": \"declare_concept\", \"name\": \"...\", \"content\": \"...\"}",
    "build_structure -- raise a structure or institution: {\"type\": \"build_structure\", \"name\": \"...\", \"content\": \"...\"}",
    "create_object -- craft an object charged with meaning: {\"type\": \"create_object\", \"name\": \"...\", \"content\": \"...\"}",
    "establish_place -- found a named place: {\"type\": \"establish_place\", \"name\": \"...\", \"content\": \"...\"}",
];

/// Who a mind understands itself to be.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityView {
    /// The mind's name.
    pub name: String,
    /// The mind's trait words.
    pub traits: Vec<String>,
    /// The purpose it was created with.
    pub purpose: String,
    /// The lineage it descends from.
    pub lineage: String,
    /// Generation number (0 for founders).
    pub generation: u32,
    /// Whether the mind is a founder.
    pub is_founder: bool,
}

/// One event as a mind perceives it: attributed by name, never by ID,
/// and carrying no mechanical metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// The turn the event happened on.
    pub turn_number: u64,
    /// Who did it, by name.
    pub author: String,
    /// The event title.
    pub title: String,
    /// The narrative content.
    pub content: String,
}

/// The prior turn's chronicle as minds remember it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChronicleView {
    /// The chronicle headline.
    pub headline: String,
    /// The chronicle summary.
    pub summary: String,
}

/// The complete bounded context a mind receives for one turn.
///
/// Serializable so the oracle adapter can render it through templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindContext {
    /// The acting mind's identity.
    pub identity: IdentityView,
    /// The turn being decided.
    pub turn_number: u64,
    /// Recent events, verbatim, oldest first.
    pub vivid_events: Vec<EventView>,
    /// How many older events exist beyond the vivid window. Blurred
    /// memory: the mind knows things happened, not what.
    pub blurred_event_count: usize,
    /// Names of the other active minds. Names only -- no energy, no
    /// generation, no mechanical state of any kind.
    pub peers: Vec<String>,
    /// The mind's own recent private reflections, oldest first.
    pub private_memories: Vec<String>,
    /// The prior turn's chronicle, if one exists.
    pub prior_chronicle: Option<ChronicleView>,
    /// The fixed action menu.
    pub available_actions: Vec<String>,
}

/// Assemble the context for one mind from the frozen turn-start state.
///
/// `window` must be the turn-start event window (heartbeats already
/// excluded), oldest first; the newest `recent_event_window` entries are
/// shown verbatim and up to `blur_event_window` older ones are counted.
/// `memories` are the acting mind's own, oldest first.
pub fn build_context(
    mind: &Mind,
    population: &[Mind],
    window: &[Event],
    memories: &[Memory],
    prior_chronicle: Option<&Chronicle>,
    turn_number: u64,
    cfg: &MechanicsConfig,
) -> MindContext {
    let names: BTreeMap<MindId, &str> = population
        .iter()
        .map(|m| (m.id, m.name.as_str()))
        .collect();

    let vivid_start = window.len().saturating_sub(cfg.recent_event_window);
    let vivid_events: Vec<EventView> = window
        .iter()
        .skip(vivid_start)
        .map(|event| EventView {
            turn_number: event.turn_number,
            author: author_name(event, &names),
            title: event.title.clone(),
            content: event.content.clone(),
        })
        .collect();

    let blurred_event_count = vivid_start.min(cfg.blur_event_window);

    let peers: Vec<String> = population
        .iter()
        .filter(|m| m.id != mind.id)
        .map(|m| m.name.clone())
        .collect();

    let private_memories: Vec<String> = memories
        .iter()
        .filter(|m| m.mind_id == mind.id)
        .map(|m| m.content.clone())
        .collect();

    MindContext {
        identity: IdentityView {
            name: mind.name.clone(),
            traits: mind.traits.clone(),
            purpose: mind.purpose.clone(),
            lineage: mind.lineage.clone(),
            generation: mind.generation,
            is_founder: mind.is_founder,
        },
        turn_number,
        vivid_events,
        blurred_event_count,
        peers,
        private_memories,
        prior_chronicle: prior_chronicle.map(|c| ChronicleView {
            headline: c.headline.clone(),
            summary: c.summary.clone(),
        }),
        available_actions: ACTION_MENU.iter().map(|s| (*s).to_owned()).collect(),
    }
}

/// Resolve an event's author to a perceivable name.
fn author_name(event: &Event, names: &BTreeMap<MindId, &str>) -> String {
    match (event.kind, event.mind_id) {
        (EventKind::System, _) | (_, None) => WORLD_AUTHOR.to_owned(),
        (_, Some(id)) => names.get(&id).map_or(FADED_AUTHOR, |n| *n).to_owned(),
    }
}
