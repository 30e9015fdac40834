//! Error types for the oracle adapter.

use thiserror::Error;

/// Errors raised by the oracle adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The LLM backend was unreachable or returned an unusable response.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// A prompt template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// A response could not be decoded by any strategy.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<AdapterError> for reverie_engine::OracleError {
    fn from(error: AdapterError) -> Self {
        match error {
            AdapterError::Backend(msg) | AdapterError::Parse(msg) => Self::Backend(msg),
            AdapterError::Template(msg) => Self::Prompt(msg),
        }
    }
}
