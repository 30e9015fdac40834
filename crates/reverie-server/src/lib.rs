//! Control-surface HTTP server for the Reverie mind simulation.
//!
//! Exposes the run-one-turn RPC (bearer-authorized, cadence-limited) and
//! read endpoints for worlds, minds, events, artifacts, and chronicles.
//! Turn execution is serialized through a single lock so at most one
//! turn runs at a time per process.

pub mod error;
pub mod handlers;
pub mod router;
pub mod seed;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use seed::ensure_world;
pub use server::{start_server, ServerError};
pub use state::{AppState, OracleHandle};
