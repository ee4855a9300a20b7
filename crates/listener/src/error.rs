//! Error types for the trigger endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use trigger::TriggerError;

/// Errors that end a trigger request with a non-success status.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The `Authorization` header is missing or not a bearer token.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token does not match.
    #[error("invalid token")]
    InvalidToken,

    /// No job with the requested name exists.
    #[error("unknown job: {0}")]
    UnknownJob(String),

    /// The trigger core refused or failed the request.
    #[error(transparent)]
    Trigger(#[from] TriggerError),
}

impl ListenerError {
    /// Returns the HTTP status code for this error.
    ///
    /// - Missing/invalid token: 401 Unauthorized
    /// - Unknown job: 404 Not Found
    /// - Malformed payload: 400 Bad Request
    /// - Host unavailable: 500 Internal Server Error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::UnknownJob(_) => StatusCode::NOT_FOUND,
            Self::Trigger(TriggerError::MalformedPayload { .. }) => StatusCode::BAD_REQUEST,
            Self::Trigger(TriggerError::HostUnavailable { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ListenerError {
    fn into_response(self) -> Response {
        // Bodies stay generic: callers learn the category, never internal state.
        let body = match &self {
            Self::MissingToken | Self::InvalidToken => "Unauthorized",
            Self::UnknownJob(_) => "Not Found",
            Self::Trigger(TriggerError::MalformedPayload { .. }) => "Malformed payload",
            Self::Trigger(TriggerError::HostUnavailable { .. }) => "Internal server error",
        };
        (self.status_code(), body).into_response()
    }
}
