//! The Reverie turn engine.
//!
//! This crate contains the full simulation mechanics: bounded context
//! assembly, the oracle seam, effect processing under hidden rules,
//! population lifecycle, ambient chaos, chronicle assembly, and the turn
//! orchestrator that runs them as a phase pipeline over the durable store.
//!
//! Minds never see mechanics. Energy, fade rolls, spawn costs, and
//! probabilities live here; the context a mind receives carries narrative
//! only.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`context`] -- Bounded per-mind context assembly
//! - [`oracle`] -- The decision/chronicle oracle seam and test oracles
//! - [`effects`] -- Applying decisions under the domain rules
//! - [`lifecycle`] -- Energy settlement, fading, founders
//! - [`chaos`] -- Ambient world-authored events
//! - [`chronicle`] -- Per-turn narrative assembly
//! - [`turn`] -- The turn orchestrator

pub mod chaos;
pub mod chronicle;
pub mod config;
pub mod context;
pub mod effects;
pub mod lifecycle;
pub mod oracle;
pub mod turn;

pub use config::{ConfigError, MechanicsConfig, ReverieConfig};
pub use context::MindContext;
pub use oracle::{Oracle, OracleError, ScriptedOracle, SilentOracle};
pub use turn::{run_turn, TurnError, TurnReport};
