//! Translation of relay outcomes into HTTP responses.
//!
//! Every error leaves the server as a JSON body `{"error": "<message>"}`.
//! Messages are fixed strings chosen by failure class; upstream bodies and
//! credentials never reach the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use nirdeshak_relay::{MalformedKind, UpstreamFailure};

/// Message used whenever the cause must not be disclosed.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Errors returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A classified chat upstream failure.
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamFailure),

    /// A speech operation failed.  Always reported as 500.
    #[error("speech failure: {0}")]
    Speech(String),

    /// The request body or form could not be understood.
    #[error("invalid request: {0}")]
    InvalidInput(String),

    /// Anything unexpected inside the relay.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Build a speech error from an upstream failure, keeping the
    /// caller-safe message for its class.
    pub fn speech(failure: &UpstreamFailure) -> Self {
        let (_, message) = failure_status(failure);
        Self::Speech(message)
    }

    /// Status code and body message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Upstream(failure) => failure_status(failure),
            Self::Speech(message) => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
            Self::InvalidInput(message) => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned()),
        }
    }
}

/// Map a classified failure to the caller-visible status and message.
pub fn failure_status(failure: &UpstreamFailure) -> (StatusCode, String) {
    match failure {
        UpstreamFailure::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timed out".into()),
        UpstreamFailure::Unavailable => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Service temporarily unavailable".into(),
        ),
        UpstreamFailure::AuthFailed => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication failed with AI service".into(),
        ),
        UpstreamFailure::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded. Please try again later".into(),
        ),
        UpstreamFailure::UpstreamError { status } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("AI service error: {status}"),
        ),
        UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid API response structure".into(),
        ),
        UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Invalid response format from AI model".into(),
        ),
        UpstreamFailure::Internal => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
        }
    }
}

/// JSON error body with the given status.
pub fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        error_body(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_table() {
        let cases = [
            (UpstreamFailure::Timeout, 504, "Request timed out"),
            (UpstreamFailure::Unavailable, 503, "Service temporarily unavailable"),
            (UpstreamFailure::AuthFailed, 500, "Authentication failed with AI service"),
            (UpstreamFailure::RateLimited, 429, "Rate limit exceeded. Please try again later"),
            (UpstreamFailure::UpstreamError { status: 502 }, 500, "AI service error: 502"),
            (
                UpstreamFailure::MalformedResponse(MalformedKind::MissingChoice),
                500,
                "Invalid API response structure",
            ),
            (
                UpstreamFailure::MalformedResponse(MalformedKind::InvalidFormat),
                500,
                "Invalid response format from AI model",
            ),
            (UpstreamFailure::Internal, 500, "Internal server error"),
        ];

        for (failure, status, message) in cases {
            let (got_status, got_message) = failure_status(&failure);
            assert_eq!(got_status.as_u16(), status, "{failure:?}");
            assert_eq!(got_message, message, "{failure:?}");
        }
    }

    #[test]
    fn speech_errors_are_always_500() {
        let err = ApiError::speech(&UpstreamFailure::RateLimited);
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Rate limit exceeded. Please try again later");
    }

    #[test]
    fn invalid_input_is_422() {
        let (status, _) = ApiError::InvalidInput("missing field".into()).status_and_message();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn internal_hides_details() {
        let (status, message) = ApiError::Internal.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, INTERNAL_MESSAGE);
    }
}
