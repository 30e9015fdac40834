//! The live oracle: prompt rendering, one LLM round trip, parsing.

use reverie_engine::chronicle::ChronicleRequest;
use reverie_engine::config::OracleConfig;
use reverie_engine::{MindContext, Oracle, OracleError};
use reverie_types::{ChronicleDraft, MindDecision};
use tracing::{debug, info};

use crate::error::AdapterError;
use crate::llm::LlmBackend;
use crate::parse::{parse_chronicle, parse_decision};
use crate::prompt::PromptEngine;

/// An oracle backed by a real LLM endpoint.
///
/// Backend failures surface as errors for the engine to log; unparseable
/// responses degrade to `None` so the affected mind is merely silent.
pub struct LiveOracle {
    backend: LlmBackend,
    prompts: PromptEngine,
}

impl LiveOracle {
    /// Create a live oracle from configuration, loading templates from
    /// disk.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Template`] when the templates directory is
    /// missing or incomplete.
    pub fn new(config: &OracleConfig) -> Result<Self, AdapterError> {
        let backend = LlmBackend::from_config(config);
        let prompts = PromptEngine::new(&config.templates_dir)?;
        info!(backend = backend.name(), model = config.model, "Oracle ready");
        Ok(Self { backend, prompts })
    }
}

impl Oracle for LiveOracle {
    async fn decide(&self, context: &MindContext) -> Result<Option<MindDecision>, OracleError> {
        let prompt = self.prompts.render_decision(context).map_err(OracleError::from)?;
        let raw = self.backend.complete(&prompt).await.map_err(OracleError::from)?;
        let decision = parse_decision(&raw);
        debug!(
            mind = context.identity.name,
            decided = decision.is_some(),
            "Oracle decision round trip complete"
        );
        Ok(decision)
    }

    async fn chronicle(
        &self,
        request: &ChronicleRequest,
    ) -> Result<Option<ChronicleDraft>, OracleError> {
        let prompt = self.prompts.render_chronicle(request).map_err(OracleError::from)?;
        let raw = self.backend.complete(&prompt).await.map_err(OracleError::from)?;
        Ok(parse_chronicle(&raw))
    }
}
