//! Enumeration types shared across the Reverie workspace.
//!
//! All enums serialize as `snake_case` strings so that the stored form,
//! the API form, and the oracle-facing form never drift apart.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldStatus {
    /// The world accepts turn advances.
    Active,
    /// The world exists but turn advances are rejected.
    Paused,
    /// The world is finished; no further turns will run.
    Ended,
}

/// Activation status of a mind.
///
/// The only defined transition is `Active` to `Inactive` through the fade
/// mechanic, and it is permanent. There is no revival path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MindStatus {
    /// The mind is processed every turn.
    Active,
    /// The mind has faded and is excluded from all future turns.
    Inactive,
}

/// Discriminant for entries in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A mind spoke aloud to the world.
    Speech,
    /// A mind performed a world-changing action.
    Action,
    /// A new mind was brought into being.
    Spawn,
    /// An ambient occurrence with engine (not mind) authorship.
    System,
}

/// Category of an artifact, fixed by the action that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// An abstract idea declared into the shared vocabulary.
    Concept,
    /// A structure or organization built by a mind.
    Institution,
    /// A crafted object charged with meaning.
    Symbol,
    /// A named location established in the world.
    Place,
}

/// Cultural standing of an artifact across turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Newly created, not yet woven into the culture.
    Emerging,
    /// Referenced by minds that disagree about it.
    Contested,
    /// Broadly accepted as part of the world's fabric.
    Canonized,
    /// No longer referenced by any living mind.
    Forgotten,
    /// Outlived its creators and became legend.
    Mythic,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::Spawn).unwrap_or_default();
        assert_eq!(json, "\"spawn\"");
    }

    #[test]
    fn artifact_kind_round_trip() {
        for kind in [
            ArtifactKind::Concept,
            ArtifactKind::Institution,
            ArtifactKind::Symbol,
            ArtifactKind::Place,
        ] {
            let json = serde_json::to_string(&kind).unwrap_or_default();
            let back: Result<ArtifactKind, _> = serde_json::from_str(&json);
            assert_eq!(back.ok(), Some(kind));
        }
    }

    #[test]
    fn world_status_parses_from_store_form() {
        let parsed: Result<WorldStatus, _> = serde_json::from_str("\"paused\"");
        assert_eq!(parsed.ok(), Some(WorldStatus::Paused));
    }
}
