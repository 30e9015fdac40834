//! Oracle seam: the trait the turn engine uses to obtain decisions and
//! chronicle drafts, plus stub implementations for tests.
//!
//! The engine never cares what sits behind the oracle -- an LLM backend,
//! a scripted bot, or a test stub. Two contracts matter:
//!
//! - `Ok(None)` means "no decision". It is not an error; it is equivalent
//!   to the mind producing no output and feeds the fade path.
//! - `Err` means the oracle itself failed. The orchestrator logs it and
//!   treats the mind as silent; a failing oracle never aborts a turn.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use reverie_types::{ChronicleDraft, MindDecision};

use crate::chronicle::ChronicleRequest;
use crate::context::MindContext;

/// Errors an oracle implementation can surface.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The backend was unreachable or returned a transport-level error.
    #[error("oracle backend error: {0}")]
    Backend(String),

    /// A prompt could not be rendered.
    #[error("prompt render error: {0}")]
    Prompt(String),
}

/// A source of mind decisions and chronicle drafts.
///
/// Methods return `impl Future + Send` rather than using `async fn` so the
/// orchestrator's own future stays `Send` for the server runtime.
pub trait Oracle: Send + Sync {
    /// Obtain a decision for one mind given its bounded context.
    fn decide(
        &self,
        context: &MindContext,
    ) -> impl Future<Output = Result<Option<MindDecision>, OracleError>> + Send;

    /// Obtain a chronicle draft for a turn's full transcript.
    fn chronicle(
        &self,
        request: &ChronicleRequest,
    ) -> impl Future<Output = Result<Option<ChronicleDraft>, OracleError>> + Send;
}

/// An oracle that never answers: every mind is silent, every chronicle
/// call yields nothing.
///
/// Exercises the full turn cycle (including fades) without a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentOracle;

impl SilentOracle {
    /// Create a new silent oracle.
    pub const fn new() -> Self {
        Self
    }
}

impl Oracle for SilentOracle {
    async fn decide(&self, _context: &MindContext) -> Result<Option<MindDecision>, OracleError> {
        Ok(None)
    }

    async fn chronicle(
        &self,
        _request: &ChronicleRequest,
    ) -> Result<Option<ChronicleDraft>, OracleError> {
        Ok(None)
    }
}

/// An oracle that replays queued canned responses, in order.
///
/// Decisions are popped per `decide` call; once the queue is empty every
/// further mind is silent. Used by the engine's property tests to script
/// exact scenarios.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    decisions: Mutex<VecDeque<Option<MindDecision>>>,
    chronicle: Mutex<Option<ChronicleDraft>>,
}

impl ScriptedOracle {
    /// Create an oracle with a queue of per-mind decisions.
    pub fn new(decisions: Vec<Option<MindDecision>>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into()),
            chronicle: Mutex::new(None),
        }
    }

    /// Set the draft returned by every chronicle call.
    #[must_use]
    pub fn with_chronicle(self, draft: ChronicleDraft) -> Self {
        if let Ok(mut slot) = self.chronicle.lock() {
            *slot = Some(draft);
        }
        self
    }
}

impl Oracle for ScriptedOracle {
    async fn decide(&self, _context: &MindContext) -> Result<Option<MindDecision>, OracleError> {
        let Ok(mut queue) = self.decisions.lock() else {
            return Ok(None);
        };
        Ok(queue.pop_front().flatten())
    }

    async fn chronicle(
        &self,
        _request: &ChronicleRequest,
    ) -> Result<Option<ChronicleDraft>, OracleError> {
        let Ok(slot) = self.chronicle.lock() else {
            return Ok(None);
        };
        Ok(slot.clone())
    }
}
