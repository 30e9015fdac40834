//! Oracle output types: the decision a mind returns each turn and the
//! chronicle draft returned by the digest pass.
//!
//! [`MindAction`] is a closed tagged union over the action kinds a mind may
//! declare. Each variant carries only its required fields, so the effect
//! processor is an exhaustive match over the tag rather than dynamic field
//! probing.

use serde::{Deserialize, Serialize};

use crate::enums::ArtifactKind;

/// Maximum number of actions honored per decision; excess is dropped.
pub const MAX_ACTIONS_PER_DECISION: usize = 3;

/// One action a mind may declare in its decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MindAction {
    /// Bring a child mind into being, subject to energy and population caps.
    SpawnMind {
        /// The child's name.
        name: String,
        /// Proposed trait set; the engine mutates it before committing.
        traits: Vec<String>,
        /// The purpose the child is created with.
        purpose: String,
    },
    /// Declare an abstract concept into the shared vocabulary.
    DeclareConcept {
        /// The concept's name.
        name: String,
        /// What the concept means.
        content: String,
    },
    /// Build a structure or organization.
    BuildStructure {
        /// The structure's name.
        name: String,
        /// What was built and why.
        content: String,
    },
    /// Craft an object charged with meaning.
    CreateObject {
        /// The object's name.
        name: String,
        /// What the object is.
        content: String,
    },
    /// Establish a named place in the world.
    EstablishPlace {
        /// The place's name.
        name: String,
        /// What the place is like.
        content: String,
    },
}

impl MindAction {
    /// The artifact category this action produces, or `None` for spawn.
    pub const fn artifact_kind(&self) -> Option<ArtifactKind> {
        match self {
            Self::SpawnMind { .. } => None,
            Self::DeclareConcept { .. } => Some(ArtifactKind::Concept),
            Self::BuildStructure { .. } => Some(ArtifactKind::Institution),
            Self::CreateObject { .. } => Some(ArtifactKind::Symbol),
            Self::EstablishPlace { .. } => Some(ArtifactKind::Place),
        }
    }
}

/// The structured decision a mind returns for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MindDecision {
    /// What the mind says aloud this turn. Empty means silence.
    #[serde(default)]
    pub speech: String,
    /// Declared actions; only the first [`MAX_ACTIONS_PER_DECISION`] are
    /// honored.
    #[serde(default)]
    pub actions: Vec<MindAction>,
    /// A private reflection, stored as a memory visible only to this mind.
    #[serde(default)]
    pub private_thought: String,
}

impl MindDecision {
    /// Whether the decision amounts to silence: no speech and no actions.
    ///
    /// Silent turns feed the fade-probability path.
    pub fn is_silent(&self) -> bool {
        self.speech.trim().is_empty() && self.actions.is_empty()
    }
}

/// The chronicle oracle's digest of one turn, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChronicleDraft {
    /// One-line headline for the turn.
    pub headline: String,
    /// Multi-paragraph narrative summary.
    pub summary: String,
    /// Ordered list of the turn's key events.
    #[serde(default)]
    pub key_events: Vec<String>,
    /// Concepts that dominated the turn.
    #[serde(default)]
    pub dominant_concepts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tag_round_trip() {
        let action = MindAction::DeclareConcept {
            name: String::from("reciprocity"),
            content: String::from("what is given returns"),
        };
        let json = serde_json::to_string(&action).unwrap_or_default();
        assert!(json.contains("\"type\":\"declare_concept\""));
        let back: Result<MindAction, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(action));
    }

    #[test]
    fn artifact_kinds_per_action() {
        let spawn = MindAction::SpawnMind {
            name: String::new(),
            traits: Vec::new(),
            purpose: String::new(),
        };
        assert_eq!(spawn.artifact_kind(), None);

        let place = MindAction::EstablishPlace {
            name: String::new(),
            content: String::new(),
        };
        assert_eq!(place.artifact_kind(), Some(ArtifactKind::Place));
    }

    #[test]
    fn decision_defaults_to_silence() {
        let decision = MindDecision::default();
        assert!(decision.is_silent());
    }

    #[test]
    fn whitespace_speech_is_silence() {
        let decision = MindDecision {
            speech: String::from("   \n"),
            actions: Vec::new(),
            private_thought: String::from("kept to myself"),
        };
        assert!(decision.is_silent());
    }

    #[test]
    fn decision_with_actions_is_not_silence() {
        let decision = MindDecision {
            speech: String::new(),
            actions: vec![MindAction::DeclareConcept {
                name: String::from("dawn"),
                content: String::from("the first light"),
            }],
            private_thought: String::new(),
        };
        assert!(!decision.is_silent());
    }

    #[test]
    fn decision_missing_fields_deserialize_as_defaults() {
        // The strict decode path must tolerate a decision that omits
        // actions or private_thought entirely.
        let parsed: Result<MindDecision, _> =
            serde_json::from_str(r#"{"speech": "hello"}"#);
        let decision = parsed.unwrap_or_default();
        assert_eq!(decision.speech, "hello");
        assert!(decision.actions.is_empty());
        assert!(decision.private_thought.is_empty());
    }
}
