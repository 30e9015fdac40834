//! Error types for the control-surface API.
//!
//! [`ApiError`] unifies all handler failure modes into a single enum
//! convertible into an HTTP response. Turn errors map onto it so the
//! engine never needs to know about status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reverie_engine::TurnError;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request lacked a valid bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The world cannot accept a turn in its current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The turn cadence has not elapsed.
    #[error("cooldown: retry in {retry_after_secs}s")]
    Cooldown {
        /// Seconds until the next turn is permitted.
        retry_after_secs: u64,
    },

    /// A turn is already running.
    #[error("a turn is already in progress")]
    TurnInProgress,

    /// A UUID could not be parsed from the request path.
    #[error("invalid UUID: {0}")]
    InvalidUuid(String),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TurnError> for ApiError {
    fn from(error: TurnError) -> Self {
        match error {
            TurnError::WorldNotFound(id) => Self::NotFound(format!("world {id}")),
            TurnError::WorldNotActive(id) => Self::Conflict(format!("world {id} is not active")),
            TurnError::Cooldown { retry_after_secs } => Self::Cooldown { retry_after_secs },
            TurnError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<reverie_store::StoreError> for ApiError {
    fn from(error: reverie_store::StoreError) -> Self {
        Self::Internal(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, retry_after) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            Self::Cooldown { retry_after_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                self.to_string(),
                Some(*retry_after_secs),
            ),
            Self::TurnInProgress => (StatusCode::TOO_MANY_REQUESTS, self.to_string(), Some(1)),
            Self::InvalidUuid(msg) | Self::InvalidQuery(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), None)
            }
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
            "retry_after_secs": retry_after,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after
            && let Ok(value) = axum::http::HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(axum::http::header::RETRY_AFTER, value);
        }
        response
    }
}
