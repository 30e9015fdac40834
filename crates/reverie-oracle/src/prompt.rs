//! Prompt template loading and rendering via `minijinja`.
//!
//! Templates are loaded from the filesystem (default: `templates/`
//! directory) so operators can tune the voice of the world without
//! recompiling. Decision prompts render the serialized mind context;
//! chronicle prompts render the turn transcript and stats.

use minijinja::Environment;
use reverie_engine::chronicle::ChronicleRequest;
use reverie_engine::MindContext;

use crate::error::AdapterError;

/// System message for chronicle calls. The chronicler is not a mind and
/// gets no identity template.
const CHRONICLER_SYSTEM: &str = "You are the chronicler of a world you observe but \
cannot enter. You write what happened, briefly and well. Respond with a single \
JSON object and nothing else.";

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with all prompt templates
/// pre-loaded. Templates can be edited on disk and are picked up on the
/// next call to [`PromptEngine::new`].
pub struct PromptEngine {
    env: Environment<'static>,
}

/// A complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message establishing the speaker's reality.
    pub system: String,
    /// User message carrying the context.
    pub user: String,
}

impl PromptEngine {
    /// Create a new prompt engine loading templates from the given
    /// directory.
    ///
    /// The directory must contain: `system.j2`, `identity.j2`,
    /// `context.j2`, `actions.j2`, `chronicle.j2`.
    pub fn new(templates_dir: &str) -> Result<Self, AdapterError> {
        let mut env = Environment::new();
        for name in ["system", "identity", "context", "actions", "chronicle"] {
            let source = load_template(templates_dir, name)?;
            env.add_template_owned(name.to_owned(), source)
                .map_err(|e| AdapterError::Template(format!("failed to add {name} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Render the full decision prompt for one mind's turn.
    pub fn render_decision(&self, context: &MindContext) -> Result<RenderedPrompt, AdapterError> {
        let value = serde_json::to_value(context)
            .map_err(|e| AdapterError::Template(format!("context serialization failed: {e}")))?;

        let system = self.render_one("system", &value)?;
        let identity = self.render_one("identity", &value)?;
        let situation = self.render_one("context", &value)?;
        let actions = self.render_one("actions", &value)?;
        let user = format!("{identity}\n\n{situation}\n\n{actions}");

        Ok(RenderedPrompt { system, user })
    }

    /// Render the chronicle prompt for a turn's transcript.
    pub fn render_chronicle(
        &self,
        request: &ChronicleRequest,
    ) -> Result<RenderedPrompt, AdapterError> {
        let value = serde_json::to_value(request)
            .map_err(|e| AdapterError::Template(format!("request serialization failed: {e}")))?;
        let user = self.render_one("chronicle", &value)?;
        Ok(RenderedPrompt {
            system: CHRONICLER_SYSTEM.to_owned(),
            user,
        })
    }

    fn render_one(&self, name: &str, value: &serde_json::Value) -> Result<String, AdapterError> {
        self.env
            .get_template(name)
            .map_err(|e| AdapterError::Template(format!("missing {name} template: {e}")))?
            .render(value)
            .map_err(|e| AdapterError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &str, name: &str) -> Result<String, AdapterError> {
    let path = format!("{dir}/{name}.j2");
    std::fs::read_to_string(&path)
        .map_err(|e| AdapterError::Template(format!("failed to read {path}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reverie_engine::config::MechanicsConfig;
    use reverie_engine::context::build_context;
    use reverie_engine::chronicle::{ChronicleRequest, TurnStats};
    use reverie_types::{Mind, MindId, MindStatus, PopulationSnapshot, WorldId};

    use super::*;

    fn write_test_templates(dir: &std::path::Path) {
        std::fs::write(
            dir.join("system.j2"),
            "You are {{ identity.name }}, a mind in a young world. Respond with JSON only.",
        )
        .ok();
        std::fs::write(
            dir.join("identity.j2"),
            "## You\nName: {{ identity.name }}\nPurpose: {{ identity.purpose }}\nTraits: {% for t in identity.traits %}{{ t }} {% endfor %}",
        )
        .ok();
        std::fs::write(
            dir.join("context.j2"),
            "## The world, turn {{ turn_number }}\n{% for e in vivid_events %}- {{ e.author }}: {{ e.content }}\n{% endfor %}Others present: {% for p in peers %}{{ p }} {% endfor %}",
        )
        .ok();
        std::fs::write(
            dir.join("actions.j2"),
            "## What you may do\n{% for a in available_actions %}- {{ a }}\n{% endfor %}",
        )
        .ok();
        std::fs::write(
            dir.join("chronicle.j2"),
            "## Turn {{ stats.turn_number }} transcript\n{{ transcript }}\n\nActive minds: {{ stats.population.active }}",
        )
        .ok();
    }

    fn sample_mind(name: &str) -> Mind {
        Mind {
            id: MindId::new(),
            world_id: WorldId::new(),
            name: name.to_owned(),
            generation: 0,
            parent_id: None,
            traits: vec![String::from("curious")],
            purpose: String::from("to wander"),
            energy: 80,
            status: MindStatus::Active,
            is_founder: true,
            lineage: name.to_lowercase(),
            born_at_turn: 0,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn decision_and_chronicle_prompts_render() {
        let unique = format!(
            "reverie_test_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        write_test_templates(&dir);

        let engine = PromptEngine::new(dir.to_str().unwrap()).unwrap();

        let mind = sample_mind("Aster");
        let peer = sample_mind("Briar");
        let population = vec![mind.clone(), peer];
        let context = build_context(
            &mind,
            &population,
            &[],
            &[],
            None,
            3,
            &MechanicsConfig::default(),
        );
        let prompt = engine.render_decision(&context).unwrap();
        assert!(prompt.system.contains("Aster"));
        assert!(prompt.user.contains("turn 3"));
        assert!(prompt.user.contains("Briar"));
        assert!(prompt.user.contains("spawn_mind"));

        let request = ChronicleRequest {
            transcript: String::from("Aster speaks: hello"),
            stats: TurnStats {
                turn_number: 3,
                speeches: 1,
                actions: 0,
                spawns: 0,
                population: PopulationSnapshot {
                    active: 2,
                    births: 0,
                    fades: 0,
                },
            },
        };
        let chronicle_prompt = engine.render_chronicle(&request).unwrap();
        assert!(chronicle_prompt.user.contains("Aster speaks"));
        assert!(chronicle_prompt.user.contains("Active minds: 2"));
        assert!(chronicle_prompt.system.contains("chronicler"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_template_returns_error() {
        let unique = format!(
            "reverie_missing_templates_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        std::fs::write(dir.join("system.j2"), "test").ok();

        assert!(PromptEngine::new(dir.to_str().unwrap()).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
