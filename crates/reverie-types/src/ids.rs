//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so that insertion order and index order coincide in the
//! durable store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a world.
    WorldId
}

define_id! {
    /// Unique identifier for a mind (an autonomous agent in a world).
    MindId
}

define_id! {
    /// Unique identifier for a turn record.
    TurnId
}

define_id! {
    /// Unique identifier for an event in the event log.
    EventId
}

define_id! {
    /// Unique identifier for an artifact (a durable named creation).
    ArtifactId
}

define_id! {
    /// Unique identifier for a private memory entry.
    MemoryId
}

define_id! {
    /// Unique identifier for a per-turn chronicle.
    ChronicleId
}
