use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use ama::{AmaError, ErrorKind};

/// Body returned for unknown tokens, wrong-role tokens and missing records alike.
pub const NOT_FOUND_MESSAGE: &str = "session not found or invalid token";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Ama(#[from] AmaError),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MalformedPayload(reason) => {
                warn!(%reason, "rejected malformed payload");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Ama(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::State => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                ErrorKind::Conflict => (StatusCode::CONFLICT, err.to_string()),
                ErrorKind::Auth | ErrorKind::NotFound => {
                    warn!(error = %err, "rejected token");
                    (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string())
                }
                ErrorKind::Internal => {
                    error!(error = %err, "request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ama::{ConflictError, StateError};
    use ama::core::ValidationError;
    use ama::perms::{Capability, PermsError};

    fn status(err: impl Into<AmaError>) -> StatusCode {
        ApiError::from(err.into()).into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status(ValidationError::EmptyTitle), StatusCode::BAD_REQUEST);
        assert_eq!(status(StateError::NotPublished), StatusCode::BAD_REQUEST);
        assert_eq!(status(ConflictError::AlreadyVoted), StatusCode::CONFLICT);
        assert_eq!(status(AmaError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(PermsError::PermissionDenied {
                required: Capability::Host
            }),
            StatusCode::NOT_FOUND
        );
    }
}
