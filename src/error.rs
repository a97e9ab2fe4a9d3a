use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub const BAD_REQUEST_MESSAGE: &str = "This endpoint expects a POST request with JSON payload.";
pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found.";

/// Failure reported by the inference provider.
#[derive(Debug, Error)]
pub enum UpstreamInferenceError {
    #[error("inference request failed: {0}")]
    Transport(String),

    #[error("inference provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("inference stream interrupted: {0}")]
    Interrupted(String),
}

/// Terminal failure for a single inbound request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{}", BAD_REQUEST_MESSAGE)]
    BadRequest,

    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] UpstreamInferenceError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::BadRequest => StatusCode::BAD_REQUEST,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        if let RelayError::Upstream(err) = &self {
            tracing::error!(error = %err, "upstream inference failed");
        }

        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(RelayError::NotFound.status(), StatusCode::NOT_FOUND);

        let upstream: RelayError = UpstreamInferenceError::Transport("refused".to_string()).into();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(RelayError::BadRequest.to_string(), BAD_REQUEST_MESSAGE);
        assert_eq!(RelayError::NotFound.to_string(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn test_upstream_message_is_transparent() {
        let err = RelayError::from(UpstreamInferenceError::Status {
            status: 429,
            message: "capacity exceeded".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "inference provider returned 429: capacity exceeded"
        );
    }
}
