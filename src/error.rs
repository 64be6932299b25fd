use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::events::EventType;

/// Result type for webhook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the webhook subsystem.
///
/// Delivery failures are deliberately *not* represented here — a failed
/// outbound call is an ordinary [`crate::delivery::DeliveryOutcome`] value,
/// never a propagating error.
#[derive(Debug, Error)]
pub enum Error {
    /// Registration-time URL validation failure. The registry is unchanged.
    #[error("Invalid webhook URL: {reason}")]
    InvalidUrl { reason: String },

    /// Event source data did not match the fixed schema for its event kind.
    /// The broadcast is aborted; no partial payload is ever sent.
    #[error("Malformed {event_type} event data: {reason}")]
    MalformedEventData { event_type: EventType, reason: String },
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            // No route returns this variant to a caller.
            Error::MalformedEventData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
