//! LLM oracle adapter for the Reverie mind simulation.
//!
//! Bridges the engine's oracle seam to real LLM endpoints: prompt
//! templates rendered with `minijinja`, HTTP round trips via `reqwest`,
//! and strict-then-salvage response decoding.
//!
//! # Modules
//!
//! - [`llm`] -- Backend enum dispatch (OpenAI-compatible, Anthropic)
//! - [`prompt`] -- Template loading and rendering
//! - [`parse`] -- Response decoding with recovery strategies
//! - [`live`] -- The [`Oracle`](reverie_engine::Oracle) implementation

pub mod error;
pub mod live;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use error::AdapterError;
pub use live::LiveOracle;
