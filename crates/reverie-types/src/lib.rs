//! Shared type definitions for the Reverie mind simulation.
//!
//! This crate is the single source of truth for all types used across the
//! Reverie workspace: the store records, the oracle output shapes, and the
//! identifiers that tie them together.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all record identifiers
//! - [`enums`] -- Enumeration types (statuses, event kinds, artifact tags)
//! - [`structs`] -- Store records (worlds, minds, turns, events, artifacts,
//!   memories, chronicles)
//! - [`decision`] -- Oracle output types (decisions, actions, chronicle
//!   drafts)

pub mod decision;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use decision::{ChronicleDraft, MindAction, MindDecision, MAX_ACTIONS_PER_DECISION};
pub use enums::{ArtifactKind, ArtifactStatus, EventKind, MindStatus, WorldStatus};
pub use ids::{ArtifactId, ChronicleId, EventId, MemoryId, MindId, TurnId, WorldId};
pub use structs::{
    Artifact, Chronicle, Event, Memory, Mind, PopulationSnapshot, Turn, World, ENERGY_MAX,
};
