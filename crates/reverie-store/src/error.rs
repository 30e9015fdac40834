//! Shared error types for the store layer.

/// Errors that can occur in the durable store.
///
/// Store failures propagate as turn-level failures to the RPC caller;
/// the engine never retries them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A `PostgreSQL` operation failed.
    #[error("postgres error: {source}")]
    Postgres {
        /// The underlying sqlx error.
        #[from]
        source: sqlx::Error,
    },

    /// A migration failed to apply.
    #[error("migration error: {source}")]
    Migration {
        /// The underlying migration error.
        #[from]
        source: sqlx::migrate::MigrateError,
    },

    /// A stored value could not be decoded into its typed form.
    #[error("corrupt record in collection {collection}: {reason}")]
    Corrupt {
        /// The collection containing the bad record.
        collection: &'static str,
        /// Why decoding failed.
        reason: String,
    },
}
