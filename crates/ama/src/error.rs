//! Error types for the AMA service.

use ama_core::ValidationError;
use ama_perms::PermsError;
use ama_store::StoreError;
use thiserror::Error;

/// Errors that can occur during AMA operations.
#[derive(Debug, Error)]
pub enum AmaError {
    /// Malformed or out-of-range input.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The presented token does not carry the required role.
    #[error("not authorized: {0}")]
    Auth(#[from] PermsError),

    /// The operation is invalid for the session's publication state.
    #[error("invalid state: {0}")]
    State(#[from] StateError),

    /// The action was already performed.
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// No session matches the token, or no question matches the id.
    #[error("not found")]
    NotFound,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Publication-state violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("session is not published yet")]
    NotPublished,

    #[error("session is already published")]
    AlreadyPublished,
}

/// Rejections of a repeated once-only action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("already voted on this question")]
    AlreadyVoted,

    #[error("question already has an answer")]
    AlreadyAnswered,
}

/// Coarse classification of an [`AmaError`], for transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    State,
    Conflict,
    NotFound,
    Internal,
}

impl AmaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AmaError::Validation(_) => ErrorKind::Validation,
            AmaError::Auth(_) => ErrorKind::Auth,
            AmaError::State(_) => ErrorKind::State,
            AmaError::Conflict(_) => ErrorKind::Conflict,
            AmaError::NotFound => ErrorKind::NotFound,
            AmaError::Store(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for AMA operations.
pub type Result<T> = std::result::Result<T, AmaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ama_perms::Capability;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            AmaError::from(ValidationError::EmptyTitle).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            AmaError::from(PermsError::PermissionDenied {
                required: Capability::Host
            })
            .kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            AmaError::from(StateError::NotPublished).kind(),
            ErrorKind::State
        );
        assert_eq!(
            AmaError::from(ConflictError::AlreadyVoted).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(AmaError::NotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            AmaError::from(StoreError::InvalidData("x".into())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AmaError::from(ConflictError::AlreadyAnswered).to_string(),
            "conflict: question already has an answer"
        );
        assert_eq!(
            AmaError::from(StateError::AlreadyPublished).to_string(),
            "invalid state: session is already published"
        );
    }
}
